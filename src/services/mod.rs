//! External collaborators: the generation source, geocoding and image search.

pub mod collaborator;
pub mod geocoding;
pub mod openai_client;
pub mod prompts;
pub mod unsplash;

pub use collaborator::{
    DisabledGeocoder, DisabledImageSearch, GenerationSource, GeocodeResolver, ImageResult,
    ImageSearch,
};
pub use geocoding::GoogleGeocoder;
pub use openai_client::OpenAIClient;
pub use unsplash::UnsplashImageSearch;
