use super::{Application, ApplicationCapability};

/// Returns the built-in catalog: terminals first, then editors, each in
/// declaration order. Menus present entries in exactly this order.
pub(super) fn builtin_capabilities() -> Vec<ApplicationCapability> {
    Application::all().map(ApplicationCapability::new).collect()
}
