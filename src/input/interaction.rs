//! Hover and select wiring between the render pipeline and the map view
//!
//! Hooks run inside the pipeline while the view is mutably borrowed, so they
//! only queue [`InteractionEvent`]s. The view drains the queue afterwards.

use crate::{
    core::geo::Point,
    data::{conversion::parse_district, geojson::GeoFeature},
    rendering::pipeline::InteractionHooks,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// What a click on a feature resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    pub state_cd: String,
    /// Leading zeros stripped; `None` when the feature's district is not numeric
    pub district: Option<i64>,
    pub unit_id: Option<String>,
    pub label: String,
}

impl SelectionContext {
    pub fn new(
        state_cd: impl Into<String>,
        district: Option<i64>,
        unit_id: Option<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            state_cd: state_cd.into(),
            district,
            unit_id,
            label: label.into(),
        }
    }

    /// Extracts the selection from a feature's property bag.
    ///
    /// `stateCd` falls back to `state`, `district` to `id`, and the label
    /// falls back to `"{state_cd}-{district}"` when there is no `name`.
    pub fn from_feature(feature: &GeoFeature) -> Result<Self> {
        let properties = feature.properties.as_ref().ok_or_else(|| {
            MapError::MalformedFeature(format!(
                "feature {:?} has no properties",
                feature.label()
            ))
        })?;

        let state_cd = properties
            .state_cd
            .as_deref()
            .or(properties.state.as_deref())
            .unwrap_or_default()
            .to_string();
        let raw_district = properties
            .district
            .as_deref()
            .or(properties.id.as_deref())
            .unwrap_or_default();
        let district = parse_district(raw_district);
        if district.is_none() {
            log::warn!(
                "feature {:?} has non-numeric district {:?}",
                feature.label(),
                raw_district
            );
        }

        let label = match &properties.name {
            Some(name) => name.clone(),
            None => match district {
                Some(d) => format!("{}-{}", state_cd, d),
                None => format!("{}-{}", state_cd, raw_district),
            },
        };

        Ok(Self {
            state_cd,
            district,
            unit_id: properties.id.clone(),
            label,
        })
    }
}

/// Queued outcome of a hook firing
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// Pointer or focus entered a feature; `page` anchors the tooltip
    Hovered { label: String, page: Point },
    Unhovered,
    Selected(SelectionContext),
}

/// Builds pipeline hooks that feed an event queue
#[derive(Debug, Clone)]
pub struct InteractionController {
    sender: Sender<InteractionEvent>,
    receiver: Receiver<InteractionEvent>,
}

impl InteractionController {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Hooks for a [`RenderStyle`](crate::rendering::pipeline::RenderStyle).
    ///
    /// A click on a feature without properties is logged and produces no event.
    pub fn hooks(&self) -> InteractionHooks {
        let hover = self.sender.clone();
        let unhover = self.sender.clone();
        let select = self.sender.clone();
        InteractionHooks::new()
            .on_hover(move |feature, page| {
                let _ = hover.send(InteractionEvent::Hovered {
                    label: feature.label().to_string(),
                    page,
                });
            })
            .on_unhover(move |_| {
                let _ = unhover.send(InteractionEvent::Unhovered);
            })
            .on_select(move |feature| match SelectionContext::from_feature(feature) {
                Ok(selection) => {
                    let _ = select.send(InteractionEvent::Selected(selection));
                }
                Err(e) => log::error!("ignoring click: {}", e),
            })
    }

    /// Everything queued since the last drain, oldest first
    pub fn drain(&self) -> Vec<InteractionEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geojson::{FeatureProperties, GeoGeometry};

    fn feature(properties: Option<FeatureProperties>) -> GeoFeature {
        GeoFeature::new(
            GeoGeometry::Polygon {
                coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            },
            properties,
        )
    }

    #[test]
    fn test_selection_from_full_properties() {
        let f = feature(Some(FeatureProperties {
            id: Some("VA-08".into()),
            name: Some("Virginia District 8".into()),
            state_cd: Some("VA".into()),
            district: Some("08".into()),
            ..Default::default()
        }));
        let selection = SelectionContext::from_feature(&f).unwrap();
        assert_eq!(
            selection,
            SelectionContext::new("VA", Some(8), Some("VA-08".into()), "Virginia District 8")
        );
    }

    #[test]
    fn test_selection_fallbacks() {
        let f = feature(Some(FeatureProperties {
            id: Some("11".into()),
            state: Some("MD".into()),
            ..Default::default()
        }));
        let selection = SelectionContext::from_feature(&f).unwrap();
        assert_eq!(selection.state_cd, "MD");
        assert_eq!(selection.district, Some(11));
        assert_eq!(selection.label, "MD-11");
    }

    #[test]
    fn test_selection_requires_properties() {
        let err = SelectionContext::from_feature(&feature(None)).unwrap_err();
        assert!(matches!(err, MapError::MalformedFeature(_)));
    }

    #[test]
    fn test_hooks_queue_events() {
        let controller = InteractionController::new();
        let hooks = controller.hooks();
        let good = feature(Some(FeatureProperties {
            id: Some("VA-08".into()),
            name: Some("Virginia District 8".into()),
            state_cd: Some("VA".into()),
            district: Some("8".into()),
            ..Default::default()
        }));

        (hooks.on_hover.as_ref().unwrap())(&good, Point::new(5.0, 6.0));
        (hooks.on_unhover.as_ref().unwrap())(&good);
        (hooks.on_select.as_ref().unwrap())(&feature(None));
        (hooks.on_select.as_ref().unwrap())(&good);

        let events = controller.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            InteractionEvent::Hovered {
                label: "Virginia District 8".into(),
                page: Point::new(5.0, 6.0)
            }
        );
        assert_eq!(events[1], InteractionEvent::Unhovered);
        assert!(matches!(&events[2], InteractionEvent::Selected(s) if s.district == Some(8)));
        assert!(controller.drain().is_empty());
    }
}
