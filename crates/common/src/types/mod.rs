use serde::Serialize;

/// Body of the root liveness probe.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Health {
    pub message: &'static str,
}

impl Health {
    pub fn healthy() -> Self {
        Self { message: "Healthy" }
    }
}
