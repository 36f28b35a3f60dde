use utoipa::OpenApi;

use crate::common::response::ErrorBody;
use crate::modules::mix::dto::{MixRequest, MixResponse};
use crate::modules::system::handler::{HealthResponse, ServiceInfo};

#[derive(OpenApi)]
#[openapi(
    info(title = "Audio Mixer Service", version = "1.0.0"),
    paths(
        crate::modules::system::handler::root,
        crate::modules::system::handler::health,
        crate::modules::mix::handler::mix,
    ),
    components(
        schemas(MixRequest, MixResponse, ErrorBody, ServiceInfo, HealthResponse)
    ),
    tags(
        (name = "Mix", description = "Voice and music mixing"),
        (name = "System", description = "Index and health probes")
    )
)]
pub struct ApiDoc;
