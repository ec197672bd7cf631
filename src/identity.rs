//! Identifiers shared verbatim by the requester and the helper.
//!
//! Both binaries are built from this crate, so a mismatch here can only come
//! from an out-of-band build; the helper advertises `MACH_SERVICE` on connect
//! and the requester refuses any other name.

/// Well-known service name the helper registers under.
pub const MACH_SERVICE: &str = "LQ3C7Y6F8J.com.roadtodream.SzContextXPCHelper";

/// Bundle identifier of the helper executable.
pub const HELPER_BUNDLE: &str = MACH_SERVICE;

/// Bundle identifier of the main application.
pub const MAIN_BUNDLE: &str = "com.roadtodream.SzContext";

/// Application group whose container holds the shared configuration and socket.
pub const APP_GROUP: &str = "LQ3C7Y6F8J.com.roadtodream";

/// URL scheme handled by the requester (`szcontext://open?...`).
pub const URL_SCHEME_NAME: &str = "szcontext";

/// File name of the helper socket inside the group container.
pub const SOCKET_FILE_NAME: &str = "helper.sock";

/// File name of the shared configuration inside the group container.
pub const CONFIG_FILE_NAME: &str = "config.toml";
