//! Concrete collaborators of the Navy core: the etcd state store and the
//! docker process launcher.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod docker;
pub mod etcd;

pub use docker::DockerLauncher;
pub use etcd::EtcdClient;
