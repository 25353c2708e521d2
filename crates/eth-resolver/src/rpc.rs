//! Alloy-backed node connection, ENS lookups and registry calls

use alloy_contract::Error as ContractError;
use alloy_eips::BlockId;
use alloy_ens::ProviderEnsExt;
use alloy_primitives::Address;
use alloy_provider::network::Ethereum;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_sol_types::sol;
use alloy_transport::TransportError;
use async_trait::async_trait;

use eth_resolver_core::NknRecord;

use crate::error::{ResolverError, Result};
use crate::transport::{CallOptions, Connection, Connector, RegistryContract};

// Account registry mapping Ethereum accounts to NKN addresses
sol! {
    #[sol(rpc)]
    contract NKNAccount {
        struct NKNAddress {
            string identifier;
            bytes32 publicKey;
        }

        function getNKNAddr(address owner) external view returns (NKNAddress memory);
    }
}

/// Dials JSON-RPC endpoints (http(s) or ws(s)) with alloy
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyConnector;

#[async_trait]
impl Connector for AlloyConnector {
    type Connection = AlloyConnection;

    async fn dial(&self, endpoint: &str) -> Result<AlloyConnection> {
        let provider = ProviderBuilder::new()
            .connect(endpoint)
            .await
            .map_err(|e| connection_error(endpoint, e))?
            .erased();

        Ok(AlloyConnection {
            provider,
            endpoint: endpoint.to_string(),
        })
    }
}

fn connection_error(endpoint: &str, e: TransportError) -> ResolverError {
    ResolverError::Connection {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    }
}

/// Request-scoped provider; the transport is torn down on drop
pub struct AlloyConnection {
    provider: DynProvider,
    endpoint: String,
}

impl Drop for AlloyConnection {
    fn drop(&mut self) {
        tracing::trace!(endpoint = %self.endpoint, "Closing node connection");
    }
}

#[async_trait]
impl Connection for AlloyConnection {
    type Registry = AlloyRegistry;

    async fn resolve_name(&self, name: &str) -> Result<Address> {
        ProviderEnsExt::<Ethereum, _>::resolve_name(&self.provider, name)
            .await
            .map_err(|e| ResolverError::NameResolution {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    fn bind(&self, contract: Address) -> Result<AlloyRegistry> {
        Ok(AlloyRegistry {
            instance: NKNAccount::new(contract, self.provider.clone()),
            endpoint: self.endpoint.clone(),
        })
    }
}

/// Account registry contract instance bound to a connection
pub struct AlloyRegistry {
    instance: NKNAccount::NKNAccountInstance<DynProvider>,
    endpoint: String,
}

fn block_id(opts: &CallOptions) -> BlockId {
    if opts.pending {
        BlockId::pending()
    } else if let Some(number) = opts.block_number {
        BlockId::number(number)
    } else {
        BlockId::latest()
    }
}

fn call_error(e: ContractError) -> ResolverError {
    ResolverError::ContractCall(e.to_string())
}

#[async_trait]
impl RegistryContract for AlloyRegistry {
    async fn get_nkn_addr(&self, opts: &CallOptions, account: Address) -> Result<NknRecord> {
        let mut call = self.instance.getNKNAddr(account).block(block_id(opts));
        if let Some(from) = opts.from {
            call = call.from(from);
        }

        let record = call.call().await.map_err(call_error)?;
        Ok(NknRecord::new(record.publicKey.0, record.identifier))
    }

    async fn ensure_deployed(&self) -> Result<()> {
        let address = *self.instance.address();
        let code = self
            .instance
            .provider()
            .get_code_at(address)
            .await
            .map_err(|e| connection_error(&self.endpoint, e))?;

        if code.is_empty() {
            return Err(ResolverError::ContractBind(format!(
                "no contract deployed at {address}"
            )));
        }
        Ok(())
    }
}
