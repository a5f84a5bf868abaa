//! Network manifest compilation.
//!
//! Turns a validator count into the topology record consumed by the external
//! network orchestrator: accounts, validator collateral and balances, and a
//! node roster where node 0 exposes the API and seeds every other node.

use std::collections::BTreeMap;

use eyre::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Minimum collateral bound to each validator account, in atto units.
const MIN_COLLATERAL: &str = "100";
/// Initial balance of each validator account (100 native tokens in atto).
const VALIDATOR_BALANCE: &str = "100000000000000000000";
/// Initial balance of the `alice` auxiliary account (200 native tokens).
const ALICE_BALANCE: &str = "200000000000000000000";
/// Initial balance of the `bob` auxiliary account (300 native tokens).
const BOB_BALANCE: &str = "300000000000000000000";

/// Compiled topology record for one ephemeral test network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkManifest {
    /// Named accounts; no secret material is carried at this layer.
    pub accounts: BTreeMap<String, AccountSpec>,
    /// Root network description.
    pub rootnet: Rootnet,
}

/// Placeholder account record; key material is generated by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSpec {}

/// Root network section of the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rootnet {
    /// Network creation mode; always a fresh network here.
    #[serde(rename = "type")]
    pub kind: String,
    /// Validator account names bound to their minimum collateral.
    pub validators: BTreeMap<String, String>,
    /// Initial balances per account.
    pub balances: BTreeMap<String, String>,
    /// Account that owns the system contracts.
    pub ipc_contracts_owner: String,
    /// Environment overrides passed to every node.
    pub env: BTreeMap<String, String>,
    /// Node roster.
    pub nodes: BTreeMap<String, NodeSpec>,
}

/// One node in the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node role.
    pub mode: NodeMode,
    /// Whether this node exposes the external API.
    pub ethapi: bool,
    /// Upstream seed nodes; empty only for the seed origin.
    pub seed_nodes: Vec<String>,
}

/// Role of a node in the test network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeMode {
    /// Validating node bound to a validator account.
    Validator {
        /// Name of the backing validator account.
        validator: String,
    },
    /// Non-validating node that only relays to its seeds.
    Seed,
}

/// Compiles a manifest for `validator_count` validators.
///
/// Validator indices are assigned deterministically from 0; validator 0's
/// node exposes the API and is the seed origin, every other node lists it as
/// its sole seed. Two auxiliary accounts (`alice`, `bob`) are always added
/// for downstream tooling. Fails only on a zero validator count.
pub fn compile(validator_count: u32) -> Result<NetworkManifest> {
    ensure!(validator_count > 0, "validator count must be at least 1");

    let mut accounts = BTreeMap::new();
    let mut validators = BTreeMap::new();
    let mut balances = BTreeMap::new();
    let mut nodes = BTreeMap::new();

    for i in 0..validator_count {
        let account = format!("validator{i}");
        accounts.insert(account.clone(), AccountSpec::default());
        validators.insert(account.clone(), MIN_COLLATERAL.to_string());
        balances.insert(account.clone(), VALIDATOR_BALANCE.to_string());

        let seed_nodes =
            if i == 0 { Vec::new() } else { vec![node_name(0)] };
        nodes.insert(
            node_name(i),
            NodeSpec {
                mode: NodeMode::Validator { validator: account },
                ethapi: i == 0,
                seed_nodes,
            },
        );
    }

    accounts.insert("alice".to_string(), AccountSpec::default());
    accounts.insert("bob".to_string(), AccountSpec::default());
    balances.insert("alice".to_string(), ALICE_BALANCE.to_string());
    balances.insert("bob".to_string(), BOB_BALANCE.to_string());

    let env = BTreeMap::from([
        ("CMT_CONSENSUS_TIMEOUT_COMMIT".to_string(), "1s".to_string()),
        ("CMT_CONSENSUS_TIMEOUT_PROPOSE".to_string(), "2s".to_string()),
        ("FM_LOG_LEVEL".to_string(), "info,fendermint=debug".to_string()),
    ]);

    Ok(NetworkManifest {
        accounts,
        rootnet: Rootnet {
            kind: "New".to_string(),
            validators,
            balances,
            ipc_contracts_owner: "validator0".to_string(),
            env,
            nodes,
        },
    })
}

fn node_name(index: u32) -> String {
    format!("node-{index}")
}

impl NetworkManifest {
    /// Serializes the manifest to the YAML artifact format.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }
}
