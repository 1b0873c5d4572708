//! Registry of synchronized collections.
//!
//! Each target binds a collection name to its remote path, its mirror path
//! on local disk, and the identity function used to deduplicate its records.
//! The registry is the single source of truth for what the reconciliation
//! pass covers and for deciding whether a failed write may be queued.

use crate::identity::Identity;
use std::path::{Path, PathBuf};

/// A synchronized collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Collection identifier
    pub name: &'static str,
    /// Provider-relative path of the remote file
    pub remote_path: &'static str,
    /// Mirror file on local disk
    pub local_path: PathBuf,
    /// Identity function for merge deduplication
    pub identity: Identity,
}

/// Build the registry of all synchronized collections.
///
/// `data_root` anchors the local mirror files; `backup_root` overrides the
/// location of the candidates mirror only (it defaults to `data_root`).
pub fn registry(data_root: &Path, backup_root: &Path) -> Vec<SyncTarget> {
    vec![
        SyncTarget {
            name: "funcionarios_ativos",
            remote_path: "funcionarios-ativos.json",
            local_path: data_root.join("funcionarios-ativos.json"),
            identity: Identity::Employee,
        },
        SyncTarget {
            name: "desligados",
            remote_path: "desligados/Ex-funcionarios.json",
            local_path: data_root.join("desligados").join("Ex-funcionarios.json"),
            identity: Identity::Employee,
        },
        SyncTarget {
            name: "candidatos",
            remote_path: "candidatos.json",
            local_path: backup_root.join("candidatos.json"),
            identity: Identity::Applicant,
        },
        SyncTarget {
            name: "empresas",
            remote_path: "empresas.json",
            local_path: data_root.join("empresas.json"),
            identity: Identity::Company,
        },
        SyncTarget {
            name: "advertencias",
            remote_path: "Advertencia/Advertencia.json",
            local_path: data_root.join("Advertencia").join("Advertencia.json"),
            identity: Identity::Warning,
        },
        SyncTarget {
            name: "funcoes",
            remote_path: "funcoes.json",
            local_path: data_root.join("funcoes.json"),
            identity: Identity::Named,
        },
        SyncTarget {
            name: "setores",
            remote_path: "setores.json",
            local_path: data_root.join("setores.json"),
            identity: Identity::Named,
        },
        SyncTarget {
            name: "lideres",
            remote_path: "lideres.json",
            local_path: data_root.join("data").join("lideres.json"),
            identity: Identity::Named,
        },
        SyncTarget {
            name: "reprovados",
            remote_path: "reprovados.json",
            local_path: data_root.join("reprovados.json"),
            identity: Identity::Rejection,
        },
    ]
}

/// Look up a target by its remote path.
pub fn target_for_path<'a>(targets: &'a [SyncTarget], remote_path: &str) -> Option<&'a SyncTarget> {
    targets.iter().find(|t| t.remote_path == remote_path)
}

/// Whether a remote path belongs to a synchronized collection.
pub fn is_sync_target(targets: &[SyncTarget], remote_path: &str) -> bool {
    target_for_path(targets, remote_path).is_some()
}
