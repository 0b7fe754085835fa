//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled only for tests or with the `test-support` feature.

mod clock;
mod external;
mod fixtures;
mod store;

pub use clock::{FixedClock, RecordingSleeper};
pub use external::{RecordingObjectStorage, ScriptedLanguageModel, ScriptedPoolManager};
pub use fixtures::{TEST_KEY_ID, TestHarness, seal, test_cipher, user, workspace};
pub use store::InMemoryStore;

pub mod openapi {
    //! OpenAPI schema lookups with diagnostic panics.

    use utoipa::openapi::schema::{Object, Schema};
    use utoipa::openapi::{OpenApi, RefOr};

    /// Resolve a named component schema to its `Object` form.
    pub fn component_object<'a>(doc: &'a OpenApi, name: &str) -> &'a Object {
        let schema = doc
            .components
            .as_ref()
            .and_then(|components| components.schemas.get(name))
            .unwrap_or_else(|| panic!("schema '{name}' is not registered"));
        match schema {
            RefOr::T(Schema::Object(object)) => object,
            RefOr::Ref(reference) => panic!(
                "schema '{name}' is a $ref to '{}'; resolve it first",
                reference.ref_location
            ),
            _ => panic!("schema '{name}' is not an object"),
        }
    }
}
