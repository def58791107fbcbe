// Identifier types shared by the studio and whatever transport fronts it.
//
// `ImageId` is assigned by the studio when it stores a finished image and is
// the only handle a client gets back; it carries no meaning beyond lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Handle for a stored, post-processed image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for ImageId {
    type Err = std::num::ParseIntError;

    /// Parses the hex form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(ImageId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parses_back() {
        let id = ImageId(0xDEAD_BEEF);
        assert_eq!(id.to_string(), "00000000deadbeef");
        assert_eq!("00000000deadbeef".parse::<ImageId>().unwrap(), id);
        assert!("not-hex".parse::<ImageId>().is_err());
    }

    #[test]
    fn serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&ImageId(7)).unwrap(), "7");
    }
}
