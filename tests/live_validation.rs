use std::{env, sync::Once};

use pdf_desk::backend::{self, BackendError, SearchBackend};
use pdf_desk::config::{self, ConfigOverrides};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() {
    INIT.call_once(|| {
        set_default_env("PDF_DESK_BACKEND", "assistant");
        set_default_env("PDF_DESK_RESOURCE_NAME", "pdf-desk-live-check");
        config::init_config(ConfigOverrides::default())
            .expect("PINECONE_API_KEY must be set for live validation");
    });
}

#[tokio::test]
#[ignore = "Requires live Pinecone API key"]
async fn live_resource_create_then_delete() {
    init_config_once();
    let backend = backend::build_backend(config::get_config()).expect("client");

    match backend.create_resource().await {
        Ok(()) | Err(BackendError::AlreadyExists(_)) => {}
        Err(error) => panic!("create failed: {error}"),
    }
    backend.delete_resource().await.expect("delete");

    let second = backend.delete_resource().await;
    assert!(
        matches!(second, Err(BackendError::NotFound(_))),
        "second delete should report a missing resource: {second:?}"
    );
}
