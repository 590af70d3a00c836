//! Hit-testing: which annotations sit under an offset, and what a tap or a
//! long press on them should do.

use serde::{Deserialize, Serialize};

use crate::document::{AnnotationKind, InteractionAnnotation, StyledDocument};

/// What the host should do in response to a gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    OpenUrl(String),
    /// Show link details instead of following it
    LinkInfo(String),
    OpenUserSheet {
        user_id: String,
        server_id: Option<String>,
    },
    SwitchChannel(String),
    EmoteInfo(String),
}

impl StyledDocument {
    /// Annotations covering byte `offset`, highest priority first.
    pub fn annotations_at(&self, offset: usize) -> Vec<&InteractionAnnotation> {
        let mut hits: Vec<_> = self
            .annotations
            .iter()
            .filter(|a| a.range.contains(&offset))
            .collect();
        hits.sort_by_key(|a| a.kind);
        hits
    }

    /// The action for a tap at `offset`.
    ///
    /// Nothing is tappable when links are not clickable, even though the
    /// annotations stay in the document.
    pub fn tap_action(&self, offset: usize) -> Option<Action> {
        if !self.links_clickable {
            return None;
        }
        self.annotations_at(offset)
            .into_iter()
            .filter(|a| a.clickable)
            .find_map(|a| self.action_for(a, false))
    }

    /// Everything a long press at `offset` can offer: link details for a
    /// URL plus every other clickable target underneath.
    pub fn long_press_actions(&self, offset: usize) -> Vec<Action> {
        self.annotations_at(offset)
            .into_iter()
            .filter(|a| a.clickable)
            .filter_map(|a| self.action_for(a, true))
            .collect()
    }

    /// Whether a tap at `offset` lands on something clickable, so the host
    /// should not pass it on to the message underneath.
    pub fn consumes_tap(&self, offset: usize) -> bool {
        self.links_clickable && self.annotations_at(offset).iter().any(|a| a.clickable)
    }

    fn action_for(&self, annotation: &InteractionAnnotation, long_press: bool) -> Option<Action> {
        let payload = annotation.payload.clone();
        match annotation.kind {
            AnnotationKind::Url if long_press => Some(Action::LinkInfo(payload)),
            AnnotationKind::Url => Some(Action::OpenUrl(payload)),
            AnnotationKind::UserMention => Some(Action::OpenUserSheet {
                user_id: payload,
                server_id: self.current_server_id.clone(),
            }),
            AnnotationKind::ChannelMention => Some(Action::SwitchChannel(payload)),
            AnnotationKind::CustomEmote => Some(Action::EmoteInfo(payload)),
            AnnotationKind::Timestamp | AnnotationKind::Checkbox => None,
        }
    }
}
