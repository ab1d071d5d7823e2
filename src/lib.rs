//! Pretrained image classifiers served over HTTP.
//!
//! Two binaries share this library: `classifier` serves a MobileNet ImageNet
//! model (`/image`, `/video`) and `nsfw_server` serves a five-class NSFW model
//! (`/image`).

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;
