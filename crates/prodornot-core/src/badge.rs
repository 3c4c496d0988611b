//! Badge geometry: the CSS a classified page's indicator is drawn with.

use crate::model::{Environment, IndicatorPosition, IndicatorSettings, IndicatorStyle};

pub const INDICATOR_ELEMENT_ID: &str = "prodornot-indicator";

const FONT_FAMILY: &str = "-apple-system, BlinkMacSystemFont, sans-serif";
const TRIANGLE_SIZE: &str = "32px";

/// Ordered CSS declarations. Later declarations of the same property replace
/// earlier ones in place, so the order matches what the browser applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeStyle {
    declarations: Vec<(&'static str, String)>,
}

impl BadgeStyle {
    fn set(&mut self, property: &'static str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .declarations
            .iter_mut()
            .find(|(existing, _)| *existing == property)
        {
            slot.1 = value;
        } else {
            self.declarations.push((property, value));
        }
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(existing, _)| *existing == property)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn declarations(&self) -> &[(&'static str, String)] {
        &self.declarations
    }

    /// `property: value` pairs joined with `;`, suitable for `style.cssText`.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeContent {
    pub icon: String,
    pub label: String,
}

/// Everything needed to draw one indicator element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub element_id: &'static str,
    pub aria_label: String,
    pub style: BadgeStyle,
    /// Ribbons carry icon and label; triangles are shape only.
    pub content: Option<BadgeContent>,
}

impl Badge {
    #[must_use]
    pub fn new(environment: &Environment, settings: IndicatorSettings) -> Self {
        let content = match settings.style {
            IndicatorStyle::Ribbon => Some(BadgeContent {
                icon: environment.icon.clone(),
                label: environment.label.clone(),
            }),
            IndicatorStyle::Triangle => None,
        };
        Self {
            element_id: INDICATOR_ELEMENT_ID,
            aria_label: format!("Environment: {}", environment.label),
            style: compute_badge_style(environment, settings),
            content,
        }
    }
}

#[must_use]
pub fn compute_badge_style(environment: &Environment, settings: IndicatorSettings) -> BadgeStyle {
    let (anchor, opposite) = match settings.position {
        IndicatorPosition::TopRight => ("right", "left"),
        IndicatorPosition::TopLeft => ("left", "right"),
    };
    let color = environment.color.as_str();

    let mut style = BadgeStyle::default();
    style.set("position", "fixed");
    style.set("top", "0");
    style.set(anchor, "0");
    // Reset the opposite side so page stylesheets cannot stretch the badge.
    style.set(opposite, "auto");
    style.set("z-index", "999999");
    style.set("font-family", FONT_FAMILY);
    style.set("font-size", "12px");
    style.set("font-weight", "bold");
    style.set("box-shadow", "0 2px 4px rgba(0,0,0,0.2)");
    style.set("user-select", "none");
    style.set("pointer-events", "none");
    style.set("color", "white");
    style.set("background-color", color);

    match settings.style {
        IndicatorStyle::Ribbon => {
            let (bottom_left, bottom_right) = match settings.position {
                IndicatorPosition::TopRight => ("4px", "0"),
                IndicatorPosition::TopLeft => ("0", "4px"),
            };
            style.set("padding", "4px 12px");
            style.set("border-bottom-left-radius", bottom_left);
            style.set("border-bottom-right-radius", bottom_right);
            style.set("display", "flex");
            style.set("align-items", "center");
            style.set("gap", "4px");
        }
        IndicatorStyle::Triangle => {
            let (width, border_color) = match settings.position {
                IndicatorPosition::TopRight => (
                    format!("0 {TRIANGLE_SIZE} {TRIANGLE_SIZE} 0"),
                    format!("transparent {color} transparent transparent"),
                ),
                IndicatorPosition::TopLeft => (
                    format!("0 0 {TRIANGLE_SIZE} {TRIANGLE_SIZE}"),
                    format!("transparent transparent transparent {color}"),
                ),
            };
            style.set("width", "0");
            style.set("height", "0");
            style.set("border-style", "solid");
            style.set("border-width", width);
            style.set("border-color", border_color);
            style.set("background-color", "transparent");
            style.set("padding", "0");
        }
    }

    style
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production() -> Environment {
        Environment::new("prod", "Production", "#f44336", "🚨")
    }

    fn settings(style: IndicatorStyle, position: IndicatorPosition) -> IndicatorSettings {
        IndicatorSettings { style, position }
    }

    #[test]
    fn ribbon_top_right_rounds_bottom_left_only() {
        let style = compute_badge_style(
            &production(),
            settings(IndicatorStyle::Ribbon, IndicatorPosition::TopRight),
        );
        assert_eq!(style.get("right"), Some("0"));
        assert_eq!(style.get("left"), Some("auto"));
        assert_eq!(style.get("border-bottom-left-radius"), Some("4px"));
        assert_eq!(style.get("border-bottom-right-radius"), Some("0"));
        assert_eq!(style.get("display"), Some("flex"));
        assert_eq!(style.get("background-color"), Some("#f44336"));
        assert_eq!(style.get("pointer-events"), Some("none"));
    }

    #[test]
    fn ribbon_top_left_rounds_bottom_right_only() {
        let style = compute_badge_style(
            &production(),
            settings(IndicatorStyle::Ribbon, IndicatorPosition::TopLeft),
        );
        assert_eq!(style.get("left"), Some("0"));
        assert_eq!(style.get("right"), Some("auto"));
        assert_eq!(style.get("border-bottom-left-radius"), Some("0"));
        assert_eq!(style.get("border-bottom-right-radius"), Some("4px"));
        assert_eq!(style.get("padding"), Some("4px 12px"));
    }

    #[test]
    fn triangle_top_right_uses_right_border() {
        let style = compute_badge_style(
            &production(),
            settings(IndicatorStyle::Triangle, IndicatorPosition::TopRight),
        );
        assert_eq!(style.get("width"), Some("0"));
        assert_eq!(style.get("height"), Some("0"));
        assert_eq!(style.get("border-width"), Some("0 32px 32px 0"));
        assert_eq!(
            style.get("border-color"),
            Some("transparent #f44336 transparent transparent")
        );
        assert_eq!(style.get("background-color"), Some("transparent"));
        assert_eq!(style.get("padding"), Some("0"));
        assert_eq!(style.get("border-bottom-left-radius"), None);
    }

    #[test]
    fn triangle_top_left_mirrors_border() {
        let style = compute_badge_style(
            &production(),
            settings(IndicatorStyle::Triangle, IndicatorPosition::TopLeft),
        );
        assert_eq!(style.get("border-width"), Some("0 0 32px 32px"));
        assert_eq!(
            style.get("border-color"),
            Some("transparent transparent transparent #f44336")
        );
        assert_eq!(style.get("left"), Some("0"));
        assert_eq!(style.get("right"), Some("auto"));
    }

    #[test]
    fn exactly_one_side_is_anchored_for_every_pair() {
        for style_kind in IndicatorStyle::ALL {
            for position in IndicatorPosition::ALL {
                let style = compute_badge_style(&production(), settings(style_kind, position));
                let sides = [style.get("left"), style.get("right")];
                assert_eq!(sides.iter().filter(|side| **side == Some("0")).count(), 1);
                assert_eq!(sides.iter().filter(|side| **side == Some("auto")).count(), 1);
                assert_eq!(style.get("position"), Some("fixed"));
                assert_eq!(style.get("top"), Some("0"));
                assert_eq!(style.get("z-index"), Some("999999"));
            }
        }
    }

    #[test]
    fn replaced_background_keeps_its_position() {
        let style = compute_badge_style(
            &production(),
            settings(IndicatorStyle::Triangle, IndicatorPosition::TopRight),
        );
        let css = style.to_css_text();
        assert!(css.starts_with("position: fixed;top: 0;right: 0;left: auto;z-index: 999999"));
        assert!(css.contains("color: white;background-color: transparent;width: 0"));
        assert_eq!(css.matches("background-color").count(), 1);
    }

    #[test]
    fn badge_content_follows_style() {
        let ribbon = Badge::new(
            &production(),
            settings(IndicatorStyle::Ribbon, IndicatorPosition::TopRight),
        );
        assert_eq!(ribbon.element_id, INDICATOR_ELEMENT_ID);
        assert_eq!(ribbon.aria_label, "Environment: Production");
        assert_eq!(
            ribbon.content,
            Some(BadgeContent {
                icon: "🚨".to_string(),
                label: "Production".to_string(),
            })
        );

        let triangle = Badge::new(
            &production(),
            settings(IndicatorStyle::Triangle, IndicatorPosition::TopLeft),
        );
        assert!(triangle.content.is_none());
    }
}
