//! Region-editing state machine.
//!
//! A session turns a stream of discrete pointer events into the two
//! artifacts a blend needs: the mask (on the target canvas) and the offset
//! that moves source pixels into it.
//!
//! ```text
//!          click              close (>= 3 vertices)          confirm
//!   Idle -------> Drawing ---------------------------> Dragging -------> Finalized
//!                  |  ^ click                           |  ^ press / move / release
//!                  +--+                                 +--+
//!
//!   reset: any state -> Idle
//! ```
//!
//! The polygon is drawn in source coordinates. Dragging moves it over the
//! target; the offset is the pointer displacement accumulated while the
//! button is held. The final mask is the polygon shifted by that offset and
//! rasterized on the target canvas.

use poisson_blend::{Mask, Offset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::polygon::{Point, Polygon};

/// One discrete input event.
///
/// Serialized with an `event` tag, e.g. `{"event": "click", "x": 4, "y": 7}`
/// or `{"event": "confirm"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Add a polygon vertex (source coordinates).
    Click { x: i32, y: i32 },
    /// Close the polygon and start placing it.
    Close,
    /// Pointer button down (target coordinates).
    Press { x: i32, y: i32 },
    /// Pointer moved; drags the polygon while the button is held.
    Move { x: i32, y: i32 },
    /// Pointer button up.
    Release,
    /// Accept the current placement.
    Confirm,
    /// Discard everything and start over.
    Reset,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Click { .. } => "click",
            SessionEvent::Close => "close",
            SessionEvent::Press { .. } => "press",
            SessionEvent::Move { .. } => "move",
            SessionEvent::Release => "release",
            SessionEvent::Confirm => "confirm",
            SessionEvent::Reset => "reset",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unexpected {event} event while {state}")]
    UnexpectedEvent {
        state: &'static str,
        event: &'static str,
    },

    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Session is not finalized (state: {0})")]
    NotFinalized(&'static str),
}

/// Current state plus the data that belongs to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Drawing {
        vertices: Vec<Point>,
    },
    Dragging {
        polygon: Polygon,
        offset: Offset,
        /// Last pointer position while the button is held.
        anchor: Option<Point>,
    },
    Finalized {
        mask: Mask,
        offset: Offset,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Drawing { .. } => "drawing",
            SessionState::Dragging { .. } => "dragging",
            SessionState::Finalized { .. } => "finalized",
        }
    }
}

/// Mask and offset produced by a finalized session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub mask: Mask,
    pub offset: Offset,
}

/// One editing session over a fixed target canvas.
#[derive(Debug, Clone)]
pub struct EditSession {
    width: usize,
    height: usize,
    state: SessionState,
}

impl EditSession {
    /// Start an idle session for a `width`×`height` target.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Feed one event.
    ///
    /// An event that makes no sense in the current state is rejected and
    /// leaves the state untouched.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        let from = self.state.name();
        let state = std::mem::take(&mut self.state);
        let (next, result) = self.transition(state, event);
        self.state = next;

        match &result {
            Ok(()) => tracing::debug!(
                event = event.name(),
                from,
                to = self.state.name(),
                "Session transition"
            ),
            Err(e) => tracing::debug!(%e, "Session event rejected"),
        }
        result
    }

    /// Feed a sequence of events, stopping at the first rejected one.
    pub fn apply_all<I>(&mut self, events: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = SessionEvent>,
    {
        events.into_iter().try_for_each(|e| self.apply(e))
    }

    /// Mask under the current placement, available while dragging and once
    /// finalized.
    pub fn preview_mask(&self) -> Option<Mask> {
        match &self.state {
            SessionState::Dragging {
                polygon, offset, ..
            } => Some(polygon.rasterize(self.width, self.height, *offset)),
            SessionState::Finalized { mask, .. } => Some(mask.clone()),
            _ => None,
        }
    }

    /// The finalized mask and offset.
    pub fn outcome(&self) -> Result<SessionOutcome, SessionError> {
        match &self.state {
            SessionState::Finalized { mask, offset } => Ok(SessionOutcome {
                mask: mask.clone(),
                offset: *offset,
            }),
            other => Err(SessionError::NotFinalized(other.name())),
        }
    }

    /// Consume the session and return its outcome.
    pub fn finish(self) -> Result<SessionOutcome, SessionError> {
        match self.state {
            SessionState::Finalized { mask, offset } => Ok(SessionOutcome { mask, offset }),
            other => Err(SessionError::NotFinalized(other.name())),
        }
    }

    fn transition(
        &self,
        state: SessionState,
        event: SessionEvent,
    ) -> (SessionState, Result<(), SessionError>) {
        use SessionEvent as E;
        use SessionState as S;

        match (state, event) {
            (_, E::Reset) => (S::Idle, Ok(())),

            (S::Idle, E::Click { x, y }) => (
                S::Drawing {
                    vertices: vec![Point::new(x, y)],
                },
                Ok(()),
            ),

            (S::Drawing { mut vertices }, E::Click { x, y }) => {
                vertices.push(Point::new(x, y));
                (S::Drawing { vertices }, Ok(()))
            }
            (S::Drawing { vertices }, E::Close) => {
                let count = vertices.len();
                match Polygon::new(vertices.clone()) {
                    Some(polygon) => (
                        S::Dragging {
                            polygon,
                            offset: Offset::ZERO,
                            anchor: None,
                        },
                        Ok(()),
                    ),
                    None => (
                        S::Drawing { vertices },
                        Err(SessionError::TooFewVertices(count)),
                    ),
                }
            }

            (S::Dragging { polygon, offset, .. }, E::Press { x, y }) => (
                S::Dragging {
                    polygon,
                    offset,
                    anchor: Some(Point::new(x, y)),
                },
                Ok(()),
            ),
            (
                S::Dragging {
                    polygon,
                    offset,
                    anchor,
                },
                E::Move { x, y },
            ) => {
                let (offset, anchor) = match anchor {
                    Some(last) => (
                        offset.saturating_add(Offset::new(
                            x.saturating_sub(last.x),
                            y.saturating_sub(last.y),
                        )),
                        Some(Point::new(x, y)),
                    ),
                    // Hovering without the button held does nothing.
                    None => (offset, None),
                };
                (
                    S::Dragging {
                        polygon,
                        offset,
                        anchor,
                    },
                    Ok(()),
                )
            }
            (S::Dragging { polygon, offset, .. }, E::Release) => (
                S::Dragging {
                    polygon,
                    offset,
                    anchor: None,
                },
                Ok(()),
            ),
            (S::Dragging { polygon, offset, .. }, E::Confirm) => {
                let mask = polygon.rasterize(self.width, self.height, offset);
                tracing::info!(
                    region = mask.count(),
                    dx = offset.dx,
                    dy = offset.dy,
                    "Placement confirmed"
                );
                (S::Finalized { mask, offset }, Ok(()))
            }

            (state, event) => {
                let err = SessionError::UnexpectedEvent {
                    state: state.name(),
                    event: event.name(),
                };
                (state, Err(err))
            }
        }
    }
}
