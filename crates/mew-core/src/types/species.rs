//! The species domain enum used by the `evolve` command and the session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

macro_rules! species {
    ($($name:ident = $id:expr,)*) => {
        /// A catchable species, numbered by its national dex id.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum Species {
            $($name = $id,)*
        }

        impl Species {
            /// Every species in dex order.
            pub const ALL: &'static [Species] = &[$(Species::$name,)*];

            /// Returns the canonical name of the species.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

species! {
    Bulbasaur = 1,
    Ivysaur = 2,
    Venusaur = 3,
    Charmander = 4,
    Charmeleon = 5,
    Charizard = 6,
    Squirtle = 7,
    Wartortle = 8,
    Blastoise = 9,
    Caterpie = 10,
    Metapod = 11,
    Butterfree = 12,
    Weedle = 13,
    Kakuna = 14,
    Beedrill = 15,
    Pidgey = 16,
    Pidgeotto = 17,
    Pidgeot = 18,
    Rattata = 19,
    Raticate = 20,
    Spearow = 21,
    Fearow = 22,
    Ekans = 23,
    Arbok = 24,
    Pikachu = 25,
    Raichu = 26,
    Sandshrew = 27,
    Sandslash = 28,
    NidoranFemale = 29,
    Nidorina = 30,
    Nidoqueen = 31,
    NidoranMale = 32,
    Nidorino = 33,
    Nidoking = 34,
    Clefairy = 35,
    Clefable = 36,
    Vulpix = 37,
    Ninetales = 38,
    Jigglypuff = 39,
    Wigglytuff = 40,
    Zubat = 41,
    Golbat = 42,
    Oddish = 43,
    Gloom = 44,
    Vileplume = 45,
    Paras = 46,
    Parasect = 47,
    Venonat = 48,
    Venomoth = 49,
    Diglett = 50,
    Dugtrio = 51,
    Meowth = 52,
    Persian = 53,
    Psyduck = 54,
    Golduck = 55,
    Mankey = 56,
    Primeape = 57,
    Growlithe = 58,
    Arcanine = 59,
    Poliwag = 60,
    Poliwhirl = 61,
    Poliwrath = 62,
    Abra = 63,
    Kadabra = 64,
    Alakazam = 65,
    Machop = 66,
    Machoke = 67,
    Machamp = 68,
    Bellsprout = 69,
    Weepinbell = 70,
    Victreebel = 71,
    Tentacool = 72,
    Tentacruel = 73,
    Geodude = 74,
    Graveler = 75,
    Golem = 76,
    Ponyta = 77,
    Rapidash = 78,
    Slowpoke = 79,
    Slowbro = 80,
    Magnemite = 81,
    Magneton = 82,
    Farfetchd = 83,
    Doduo = 84,
    Dodrio = 85,
    Seel = 86,
    Dewgong = 87,
    Grimer = 88,
    Muk = 89,
    Shellder = 90,
    Cloyster = 91,
    Gastly = 92,
    Haunter = 93,
    Gengar = 94,
    Onix = 95,
    Drowzee = 96,
    Hypno = 97,
    Krabby = 98,
    Kingler = 99,
    Voltorb = 100,
    Electrode = 101,
    Exeggcute = 102,
    Exeggutor = 103,
    Cubone = 104,
    Marowak = 105,
    Hitmonlee = 106,
    Hitmonchan = 107,
    Lickitung = 108,
    Koffing = 109,
    Weezing = 110,
    Rhyhorn = 111,
    Rhydon = 112,
    Chansey = 113,
    Tangela = 114,
    Kangaskhan = 115,
    Horsea = 116,
    Seadra = 117,
    Goldeen = 118,
    Seaking = 119,
    Staryu = 120,
    Starmie = 121,
    MrMime = 122,
    Scyther = 123,
    Jynx = 124,
    Electabuzz = 125,
    Magmar = 126,
    Pinsir = 127,
    Tauros = 128,
    Magikarp = 129,
    Gyarados = 130,
    Lapras = 131,
    Ditto = 132,
    Eevee = 133,
    Vaporeon = 134,
    Jolteon = 135,
    Flareon = 136,
    Porygon = 137,
    Omanyte = 138,
    Omastar = 139,
    Kabuto = 140,
    Kabutops = 141,
    Aerodactyl = 142,
    Snorlax = 143,
    Articuno = 144,
    Zapdos = 145,
    Moltres = 146,
    Dratini = 147,
    Dragonair = 148,
    Dragonite = 149,
    Mewtwo = 150,
    Mew = 151,
}

impl Species {
    /// Returns the dex number.
    pub fn id(&self) -> u16 {
        *self as u16
    }

    /// Looks a species up by dex number.
    pub fn from_id(id: u16) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|index| Self::ALL.get(usize::from(index)))
            .copied()
    }

    /// Returns whether the species has a further evolution stage.
    pub fn can_evolve(&self) -> bool {
        matches!(
            self,
            Self::Bulbasaur
                | Self::Ivysaur
                | Self::Charmander
                | Self::Charmeleon
                | Self::Squirtle
                | Self::Wartortle
                | Self::Caterpie
                | Self::Metapod
                | Self::Weedle
                | Self::Kakuna
                | Self::Pidgey
                | Self::Pidgeotto
                | Self::Rattata
                | Self::Spearow
                | Self::Ekans
                | Self::Pikachu
                | Self::Sandshrew
                | Self::NidoranFemale
                | Self::Nidorina
                | Self::NidoranMale
                | Self::Nidorino
                | Self::Clefairy
                | Self::Vulpix
                | Self::Jigglypuff
                | Self::Zubat
                | Self::Oddish
                | Self::Gloom
                | Self::Paras
                | Self::Venonat
                | Self::Diglett
                | Self::Meowth
                | Self::Psyduck
                | Self::Mankey
                | Self::Growlithe
                | Self::Poliwag
                | Self::Poliwhirl
                | Self::Abra
                | Self::Kadabra
                | Self::Machop
                | Self::Machoke
                | Self::Bellsprout
                | Self::Weepinbell
                | Self::Tentacool
                | Self::Geodude
                | Self::Graveler
                | Self::Ponyta
                | Self::Slowpoke
                | Self::Magnemite
                | Self::Doduo
                | Self::Seel
                | Self::Grimer
                | Self::Shellder
                | Self::Gastly
                | Self::Haunter
                | Self::Drowzee
                | Self::Krabby
                | Self::Voltorb
                | Self::Exeggcute
                | Self::Cubone
                | Self::Koffing
                | Self::Rhyhorn
                | Self::Horsea
                | Self::Goldeen
                | Self::Staryu
                | Self::Magikarp
                | Self::Eevee
                | Self::Omanyte
                | Self::Kabuto
                | Self::Dratini
                | Self::Dragonair
        )
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = AppError;

    /// Accepts a dex number or a species name, ignoring case and any
    /// non-alphanumeric characters (`"Mr. Mime"` parses as `MrMime`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<u16>() {
            return Self::from_id(id)
                .ok_or_else(|| AppError::parse(format!("Error - {trimmed} is not a valid pokemon!")));
        }

        let wanted: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|species| species.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| AppError::parse(format!("Error - {trimmed} is not a valid pokemon!")))
    }
}

/// What an `evolve` request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolveTarget {
    /// Every evolvable species the evolve filter permits.
    All,
    /// A single, explicitly named species.
    Species(Species),
}

impl fmt::Display for EvolveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Species(species) => fmt::Display::fmt(species, f),
        }
    }
}

impl FromStr for EvolveTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Species)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dex_numbers() {
        assert_eq!(Species::ALL.len(), 151);
        assert_eq!(Species::Bulbasaur.id(), 1);
        assert_eq!(Species::Pikachu.id(), 25);
        assert_eq!(Species::Mew.id(), 151);
        assert_eq!(Species::from_id(25), Some(Species::Pikachu));
        assert_eq!(Species::from_id(0), None);
        assert_eq!(Species::from_id(152), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("pikachu".parse::<Species>().ok(), Some(Species::Pikachu));
        assert_eq!("PIDGEY".parse::<Species>().ok(), Some(Species::Pidgey));
        assert_eq!("Mr. Mime".parse::<Species>().ok(), Some(Species::MrMime));
        assert_eq!("133".parse::<Species>().ok(), Some(Species::Eevee));
        assert!("agumon".parse::<Species>().is_err());
        assert!("999".parse::<Species>().is_err());
    }

    #[test]
    fn test_can_evolve() {
        assert!(Species::Magikarp.can_evolve());
        assert!(Species::Pidgeotto.can_evolve());
        assert!(!Species::Gyarados.can_evolve());
        assert!(!Species::Tauros.can_evolve());
        assert!(!Species::Mew.can_evolve());
    }

    #[test]
    fn test_parse_evolve_target() {
        assert_eq!("ALL".parse::<EvolveTarget>().ok(), Some(EvolveTarget::All));
        assert_eq!(
            "eevee".parse::<EvolveTarget>().ok(),
            Some(EvolveTarget::Species(Species::Eevee))
        );
        let err = "agumon".parse::<EvolveTarget>().unwrap_err();
        assert_eq!(err.message, "Error - agumon is not a valid pokemon!");
    }
}
