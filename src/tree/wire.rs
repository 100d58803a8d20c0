//! Wire shape: `{name, image_path, element_1?, element_2?}`.

use super::SolutionTree;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};

impl Serialize for SolutionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.is_leaf() { 2 } else { 4 };
        let mut state = serializer.serialize_struct("SolutionTree", fields)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("image_path", self.image_path())?;
        if let Some((first, second)) = self.children() {
            state.serialize_field("element_1", first)?;
            state.serialize_field("element_2", second)?;
        }
        state.end()
    }
}

#[derive(serde::Deserialize)]
struct WireTree {
    name: String,
    #[serde(default)]
    image_path: String,
    #[serde(default)]
    element_1: Option<Box<WireTree>>,
    #[serde(default)]
    element_2: Option<Box<WireTree>>,
}

impl TryFrom<WireTree> for SolutionTree {
    type Error = String;

    fn try_from(wire: WireTree) -> Result<Self, Self::Error> {
        match (wire.element_1, wire.element_2) {
            (None, None) => Ok(SolutionTree::leaf(wire.name, wire.image_path)),
            (Some(first), Some(second)) => Ok(SolutionTree::combine(
                wire.name,
                wire.image_path,
                SolutionTree::try_from(*first)?,
                SolutionTree::try_from(*second)?,
            )),
            _ => Err(format!(
                "tree node '{}' must have either zero or two children",
                wire.name
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SolutionTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireTree::deserialize(deserializer)?;
        SolutionTree::try_from(wire).map_err(de::Error::custom)
    }
}
