//! System-wide constants and the state store key layout.

/// Root of the per-container state documents in the key-value store.
pub const CONTAINERS_KEY_PREFIX: &str = "/navy/containers";

/// Default etcd host used when none is configured.
pub const DEFAULT_ETCD_HOST: &str = "127.0.0.1";

/// Default etcd client port.
pub const DEFAULT_ETCD_PORT: u16 = 4001;

/// Default program used to run container commands.
pub const DEFAULT_DOCKER_PROGRAM: &str = "docker";

/// Link source every app-to-app link is routed through.
pub const HOST_PROXY_ALIAS: &str = "host_proxy";

/// Mode name given to pre-task containers.
pub const PRETASKS_MODE: &str = "pretasks";

/// Mode name given to post-task containers.
pub const POSTTASKS_MODE: &str = "posttasks";

/// Value of the `state` field marking an errored container.
pub const ERROR_STATE: &str = "error";

/// Returns the key holding the desired state document of a container.
#[must_use]
pub fn desired_key(container_name: &str) -> String {
    format!("{CONTAINERS_KEY_PREFIX}/{container_name}/desired")
}

/// Returns the key holding the actual state document of a container.
#[must_use]
pub fn actual_key(container_name: &str) -> String {
    format!("{CONTAINERS_KEY_PREFIX}/{container_name}/actual")
}
