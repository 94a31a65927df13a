use serde::{Deserialize, Serialize};

/// Collision category of an entity.
///
/// Closed set: every physical object carries exactly one tag. Strings coming
/// from level data that match none of the known names map to `Untagged`,
/// which every dispatcher treats as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tag {
    #[default]
    Untagged,
    Player,
    Ground,
    Obstacle,
    BouncingPlatform,
    Food,
    LostWeight,
    CheckPoint,
    Trap,
    Finish,
}

impl Tag {
    /// Look up a tag by its level-data name. Unknown names are `Untagged`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Player" => Tag::Player,
            "Ground" => Tag::Ground,
            "Obstacle" => Tag::Obstacle,
            "BouncingPlatform" => Tag::BouncingPlatform,
            "Food" => Tag::Food,
            "LostWeight" => Tag::LostWeight,
            "CheckPoint" => Tag::CheckPoint,
            "Trap" => Tag::Trap,
            "Finish" => Tag::Finish,
            _ => Tag::Untagged,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Untagged => "Untagged",
            Tag::Player => "Player",
            Tag::Ground => "Ground",
            Tag::Obstacle => "Obstacle",
            Tag::BouncingPlatform => "BouncingPlatform",
            Tag::Food => "Food",
            Tag::LostWeight => "LostWeight",
            Tag::CheckPoint => "CheckPoint",
            Tag::Trap => "Trap",
            Tag::Finish => "Finish",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_untagged() {
        assert_eq!(Tag::from_name("Lava"), Tag::Untagged);
        assert_eq!(Tag::from_name(""), Tag::Untagged);
        assert_eq!(Tag::from_name("food"), Tag::Untagged);
    }

    #[test]
    fn names_resolve_back() {
        for tag in [Tag::Food, Tag::Trap, Tag::CheckPoint, Tag::BouncingPlatform] {
            assert_eq!(Tag::from_name(tag.name()), tag);
        }
    }
}
