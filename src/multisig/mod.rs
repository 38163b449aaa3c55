mod error;
mod instructions;
mod pda;
mod state;

pub use error::{MultisigError, MultisigResult};
pub use instructions::{VaultTransactionExecuteAccounts, vault_transaction_execute};
pub use pda::{SQUADS_PROGRAM_ID, multisig_pda, proposal_pda, transaction_pda, vault_pda};
pub use state::{Member, Multisig, Permissions, fetch_multisig};
