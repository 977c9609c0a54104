#![forbid(unsafe_code)]

//! Layout style knobs stored under the `styleProps` extension property.
//!
//! Nodes keep style as loose JSON so unknown keys written by other tools
//! survive; [`StyleProps`] is the typed view the style editor works with.
//! Reading fills absent or malformed keys with defaults, and [`merge_style`] writes a
//! single knob without disturbing the rest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::{STYLE_PROPERTY, TreeNode};

/// Main-axis direction of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

/// Cross-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
}

/// Main-axis distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
    Stretch,
    FlexEnd,
}

/// Grid column spans are 1..=12.
pub const GRID_COLUMNS: u8 = 12;

/// Height slider bounds, in pixels.
pub const MIN_HEIGHT: u32 = 100;
pub const MAX_HEIGHT: u32 = 1000;
pub const HEIGHT_STEP: u32 = 8;

/// Typed view over a node's `styleProps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleProps {
    /// Column span on narrow screens.
    pub xs: u8,
    /// Column span on medium screens.
    pub md: u8,
    pub row_spacing: u8,
    pub column_spacing: u8,
    pub direction: FlexDirection,
    pub align_items: AlignItems,
    pub justify_content: JustifyContent,
    pub height: u32,
}

impl Default for StyleProps {
    fn default() -> Self {
        Self {
            xs: GRID_COLUMNS,
            md: GRID_COLUMNS,
            row_spacing: 0,
            column_spacing: 0,
            direction: FlexDirection::Row,
            align_items: AlignItems::FlexStart,
            justify_content: JustifyContent::FlexStart,
            height: MIN_HEIGHT,
        }
    }
}

impl StyleProps {
    /// Read the style of `node`. Each absent or malformed knob falls back to
    /// its default on its own; well-formed knobs beside it are kept.
    #[must_use]
    pub fn of(node: &TreeNode) -> Self {
        let mut style = Self::default();
        let Some(map) = node.props.get(STYLE_PROPERTY).and_then(Value::as_object) else {
            return style;
        };
        read_knob(map, "xs", &mut style.xs);
        read_knob(map, "md", &mut style.md);
        read_knob(map, "rowSpacing", &mut style.row_spacing);
        read_knob(map, "columnSpacing", &mut style.column_spacing);
        read_knob(map, "direction", &mut style.direction);
        read_knob(map, "alignItems", &mut style.align_items);
        read_knob(map, "justifyContent", &mut style.justify_content);
        read_knob(map, "height", &mut style.height);
        style
    }

    /// Clamp spans into `1..=12` and height into the slider range, snapped to
    /// the slider step.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.xs = self.xs.clamp(1, GRID_COLUMNS);
        self.md = self.md.clamp(1, GRID_COLUMNS);
        let height = self.height.clamp(MIN_HEIGHT, MAX_HEIGHT);
        self.height = MIN_HEIGHT + (height - MIN_HEIGHT) / HEIGHT_STEP * HEIGHT_STEP;
        self
    }
}

fn read_knob<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    if let Some(value) = map.get(key).and_then(|raw| T::deserialize(raw).ok()) {
        *slot = value;
    }
}

/// Updater for `set_property(.., STYLE_PROPERTY, ..)` that sets one knob and
/// keeps every other key of the existing style object.
pub fn merge_style(
    key: impl Into<String>,
    value: impl Into<Value>,
) -> impl FnOnce(Option<&Value>) -> Option<Value> {
    let key = key.into();
    let value = value.into();
    move |old| {
        let mut map = old
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);
        map.insert(key, value);
        Some(Value::Object(map))
    }
}
