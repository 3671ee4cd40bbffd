pub mod blend;

pub use blend::{handle_blend, BlendRequest, ErrorResponse, OffsetParams, __path_handle_blend};
