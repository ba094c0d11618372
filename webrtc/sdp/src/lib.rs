//! SDP Module - Session Description Protocol
//!
//! The subset of RFC 4566 needed to carry offers and answers between two
//! peer endpoints: session header, timing, media sections and attributes.

pub mod attribute;
pub mod direction;
pub mod errors;
pub mod media_description;
pub mod origin;
pub mod sdp_type;
pub mod session_description;
pub mod session_description_builder;
pub mod timing;

pub use attribute::Attribute;
pub use direction::Direction;
pub use errors::SdpError;
pub use media_description::MediaDescription;
pub use origin::Origin;
pub use sdp_type::SdpType;
pub use session_description::SessionDescription;
pub use session_description_builder::SessionDescriptionBuilder;
pub use timing::Timing;
