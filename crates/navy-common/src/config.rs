//! Runtime settings shared by the etcd client, the launcher and the CLI.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DOCKER_PROGRAM, DEFAULT_ETCD_HOST, DEFAULT_ETCD_PORT};

/// Settings describing where the collaborators of the core live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavyConfig {
    /// Host of the etcd server holding container state documents.
    pub etcd_host: String,
    /// Client port of the etcd server.
    pub etcd_port: u16,
    /// Program invoked with the generated container commands.
    pub docker_program: String,
}

impl NavyConfig {
    /// Base URL of the etcd v2 keys API.
    #[must_use]
    pub fn etcd_base_url(&self) -> String {
        format!("http://{}:{}/v2/keys", self.etcd_host, self.etcd_port)
    }
}

impl Default for NavyConfig {
    fn default() -> Self {
        Self {
            etcd_host: DEFAULT_ETCD_HOST.to_string(),
            etcd_port: DEFAULT_ETCD_PORT,
            docker_program: DEFAULT_DOCKER_PROGRAM.to_string(),
        }
    }
}
