use jsonrpc_derive::rpc;
use serde_json::Value;

use crate::method::{BoundMethod, Method, MethodDescriptor};
use crate::namespaces::Result;
use crate::request_manager::{HasRequestManager, RequestManager};

/// Every method of the `account` namespace, in installation order.
pub const ACCOUNT_METHODS: [MethodDescriptor; 14] = [
    MethodDescriptor::new("call", "account_call", 5),
    MethodDescriptor::new("closeWallet", "account_closeWallet", 0),
    MethodDescriptor::new("createAccount", "account_createAccount", 0),
    MethodDescriptor::new("createCode", "account_createCode", 3),
    MethodDescriptor::new("createWallet", "account_createWallet", 1),
    MethodDescriptor::new("dumpPrivkey", "account_dumpPrivkey", 1),
    MethodDescriptor::new("gasPrice", "account_gasPrice", 0),
    MethodDescriptor::new("getCode", "account_getCode", 1),
    MethodDescriptor::new("listAddress", "account_listAddress", 0),
    MethodDescriptor::new("lockWallet", "account_lockWallet", 0),
    MethodDescriptor::new("openWallet", "account_openWallet", 1),
    MethodDescriptor::new("sign", "account_sign", 2),
    MethodDescriptor::new("transfer", "account_transfer", 3),
    MethodDescriptor::new("unLockWallet", "account_unLockWallet", 1),
];

/// Builds a fresh set of unbound methods from the catalog, in catalog order.
pub fn methods() -> [Method; 14] {
    ACCOUNT_METHODS.map(|descriptor| Method::from(&descriptor))
}

/// Client side of the `account` namespace: one callable per remote method,
/// all routed through the request manager of the context it was built from.
#[derive(Debug, Clone)]
pub struct AccountNamespace {
    request_manager: RequestManager,
    pub call: BoundMethod,
    pub close_wallet: BoundMethod,
    pub create_account: BoundMethod,
    pub create_code: BoundMethod,
    pub create_wallet: BoundMethod,
    pub dump_privkey: BoundMethod,
    pub gas_price: BoundMethod,
    pub get_code: BoundMethod,
    pub list_address: BoundMethod,
    pub lock_wallet: BoundMethod,
    pub open_wallet: BoundMethod,
    pub sign: BoundMethod,
    pub transfer: BoundMethod,
    pub un_lock_wallet: BoundMethod,
}

impl AccountNamespace {
    pub fn new<C: HasRequestManager + ?Sized>(context: &C) -> Self {
        let request_manager = context.request_manager().clone();
        // Fields are listed in catalog order.
        let [
            call,
            close_wallet,
            create_account,
            create_code,
            create_wallet,
            dump_privkey,
            gas_price,
            get_code,
            list_address,
            lock_wallet,
            open_wallet,
            sign,
            transfer,
            un_lock_wallet,
        ] =
            methods().map(|method| method.bind(request_manager.clone()));

        let namespace = Self {
            call,
            close_wallet,
            create_account,
            create_code,
            create_wallet,
            dump_privkey,
            gas_price,
            get_code,
            list_address,
            lock_wallet,
            open_wallet,
            sign,
            transfer,
            un_lock_wallet,
            request_manager,
        };
        tracing::trace!("account namespace installed {} methods", ACCOUNT_METHODS.len());
        namespace
    }

    pub fn request_manager(&self) -> &RequestManager {
        &self.request_manager
    }

    /// Installed callables in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundMethod> {
        vec![
            &self.call,
            &self.close_wallet,
            &self.create_account,
            &self.create_code,
            &self.create_wallet,
            &self.dump_privkey,
            &self.gas_price,
            &self.get_code,
            &self.list_address,
            &self.lock_wallet,
            &self.open_wallet,
            &self.sign,
            &self.transfer,
            &self.un_lock_wallet,
        ]
        .into_iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(BoundMethod::name).collect()
    }

    /// Looks up a callable by its catalog name, e.g. `unLockWallet`.
    pub fn get(&self, name: &str) -> Option<&BoundMethod> {
        self.iter().find(|method| method.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BoundMethod> {
        let method = match name {
            "call" => &mut self.call,
            "closeWallet" => &mut self.close_wallet,
            "createAccount" => &mut self.create_account,
            "createCode" => &mut self.create_code,
            "createWallet" => &mut self.create_wallet,
            "dumpPrivkey" => &mut self.dump_privkey,
            "gasPrice" => &mut self.gas_price,
            "getCode" => &mut self.get_code,
            "listAddress" => &mut self.list_address,
            "lockWallet" => &mut self.lock_wallet,
            "openWallet" => &mut self.open_wallet,
            "sign" => &mut self.sign,
            "transfer" => &mut self.transfer,
            "unLockWallet" => &mut self.un_lock_wallet,
            _ => return None,
        };
        Some(method)
    }
}

///
/// Server side of the `account` namespace, for handlers answering the same calls.
///
#[rpc(server)]
pub trait AccountNamespaceT {
    #[rpc(name = "account_call")]
    fn call(
        &self,
        from: Value,
        to: Value,
        input: Value,
        amount: Value,
        gas_price: Value,
    ) -> Result<Value>;

    #[rpc(name = "account_closeWallet")]
    fn close_wallet(&self) -> Result<Value>;

    #[rpc(name = "account_createAccount")]
    fn create_account(&self) -> Result<Value>;

    #[rpc(name = "account_createCode")]
    fn create_code(&self, from: Value, byte_code: Value, amount: Value) -> Result<Value>;

    #[rpc(name = "account_createWallet")]
    fn create_wallet(&self, password: Value) -> Result<Value>;

    #[rpc(name = "account_dumpPrivkey")]
    fn dump_privkey(&self, address: Value) -> Result<Value>;

    #[rpc(name = "account_gasPrice")]
    fn gas_price(&self) -> Result<Value>;

    #[rpc(name = "account_getCode")]
    fn get_code(&self, address: Value) -> Result<Value>;

    #[rpc(name = "account_listAddress")]
    fn list_address(&self) -> Result<Value>;

    #[rpc(name = "account_lockWallet")]
    fn lock_wallet(&self) -> Result<Value>;

    #[rpc(name = "account_openWallet")]
    fn open_wallet(&self, password: Value) -> Result<Value>;

    #[rpc(name = "account_sign")]
    fn sign(&self, address: Value, message: Value) -> Result<Value>;

    #[rpc(name = "account_transfer")]
    fn transfer(&self, from: Value, to: Value, amount: Value) -> Result<Value>;

    #[rpc(name = "account_unLockWallet")]
    fn un_lock_wallet(&self, password: Value) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use jsonrpc_core::{Error, Id};
    use maplit::btreeset;
    use serde_json::json;
    use tracing_subscriber::filter::LevelFilter;

    use super::*;
    use crate::error::RequestError;
    use crate::provider::LocalProvider;
    use crate::testing::RecordingProvider;

    const ALICE: &str = "0x36615cf349d7f6344891b1e7ca7c72883f5dc049";
    const BOB: &str = "0xa61464658afeaf65cccaafd3a512b69a83b77618";

    fn namespace_with(provider: RecordingProvider) -> AccountNamespace {
        AccountNamespace::new(&RequestManager::new(provider))
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let names: BTreeSet<&str> = ACCOUNT_METHODS.iter().map(|d| d.name).collect();
        assert_eq!(ACCOUNT_METHODS.len(), names.len());
    }

    #[test]
    fn test_methods_factory_builds_fresh_catalog() {
        let methods = methods();
        assert_eq!(14, methods.len());
        for (method, descriptor) in methods.iter().zip(ACCOUNT_METHODS.iter()) {
            assert_eq!(descriptor.name, method.name());
            assert_eq!(descriptor.remote_call, method.call());
            assert_eq!(descriptor.param_count, method.params());
        }
    }

    #[test]
    fn test_installs_exactly_the_account_methods() {
        let namespace = namespace_with(RecordingProvider::new());
        let installed: BTreeSet<&str> = namespace.names().into_iter().collect();

        assert_eq!(
            btreeset! {
                "call", "closeWallet", "createAccount", "createCode", "createWallet",
                "dumpPrivkey", "gasPrice", "getCode", "listAddress", "lockWallet",
                "openWallet", "sign", "transfer", "unLockWallet",
            },
            installed
        );
        assert_eq!(14, namespace.iter().count());
    }

    #[test]
    fn test_fields_hold_their_named_method() {
        let namespace = namespace_with(RecordingProvider::new());
        assert_eq!("account_call", namespace.call.remote_call());
        assert_eq!("account_closeWallet", namespace.close_wallet.remote_call());
        assert_eq!("account_dumpPrivkey", namespace.dump_privkey.remote_call());
        assert_eq!("account_gasPrice", namespace.gas_price.remote_call());
        assert_eq!("account_getCode", namespace.get_code.remote_call());
        assert_eq!("account_sign", namespace.sign.remote_call());
        assert_eq!("account_transfer", namespace.transfer.remote_call());
        assert_eq!("account_unLockWallet", namespace.un_lock_wallet.remote_call());
    }

    #[test]
    fn test_installed_members_follow_catalog() {
        let namespace = namespace_with(RecordingProvider::new());
        for (method, descriptor) in namespace.iter().zip(ACCOUNT_METHODS.iter()) {
            assert_eq!(descriptor.name, method.name());
            assert_eq!(descriptor.remote_call, method.remote_call());
            assert_eq!(descriptor.param_count, method.param_count());
        }
    }

    #[test]
    fn test_remote_call_and_param_count() {
        let namespace = namespace_with(RecordingProvider::new());

        assert_eq!("account_sign", namespace.sign.remote_call());
        assert_eq!(2, namespace.sign.param_count());
        assert_eq!(3, namespace.transfer.param_count());
        assert_eq!(0, namespace.close_wallet.param_count());
        assert_eq!(5, namespace.call.param_count());
        assert_eq!(
            "account_unLockWallet",
            namespace.get("unLockWallet").expect("missing").remote_call()
        );
        assert!(namespace.get("unlockWallet").is_none());
    }

    #[test]
    fn test_every_member_shares_the_context_manager() {
        let manager = RequestManager::new(RecordingProvider::new());
        let namespace = AccountNamespace::new(&manager);

        assert!(namespace.request_manager().same_as(&manager));
        assert!(namespace
            .iter()
            .all(|method| method.request_manager().same_as(&manager)));
    }

    #[test]
    fn test_get_mut_covers_every_name() {
        let mut namespace = namespace_with(RecordingProvider::new());
        for descriptor in ACCOUNT_METHODS.iter() {
            let method = namespace.get_mut(descriptor.name).expect("missing member");
            assert_eq!(descriptor.remote_call, method.remote_call());
        }
        assert!(namespace.get_mut("send").is_none());
    }

    #[test]
    fn test_namespaces_do_not_share_callables() {
        let manager = RequestManager::new(RecordingProvider::new());
        let mut first = AccountNamespace::new(&manager);
        let second = AccountNamespace::new(&manager);

        let other = RequestManager::without_provider();
        first
            .get_mut("sign")
            .expect("missing sign")
            .set_request_manager(other.clone());

        assert!(first.sign.request_manager().same_as(&other));
        assert!(second.sign.request_manager().same_as(&manager));
        assert!(first.transfer.request_manager().same_as(&manager));
    }

    #[tokio::test]
    async fn test_gas_price_forwards_without_params() {
        let provider = RecordingProvider::new();
        let namespace = namespace_with(provider.clone());

        let result = namespace.gas_price.call(vec![]).await.expect("failed gasPrice");
        assert_eq!(json!({"method": "account_gasPrice", "params": []}), result);

        let calls = provider.calls();
        assert_eq!(1, calls.len());
        assert_eq!("account_gasPrice", calls[0].method);
        assert_eq!(jsonrpc_core::Params::Array(vec![]), calls[0].params);
    }

    #[tokio::test]
    async fn test_transfer_forwards_params_in_order() {
        let provider = RecordingProvider::new();
        let namespace = namespace_with(provider.clone());

        namespace
            .transfer
            .call(vec![json!(ALICE), json!(BOB), json!("0x64")])
            .await
            .expect("failed transfer");

        let calls = provider.calls();
        assert_eq!(1, calls.len());
        assert_eq!("account_transfer", calls[0].method);
        assert_eq!(
            jsonrpc_core::Params::Array(vec![json!(ALICE), json!(BOB), json!("0x64")]),
            calls[0].params
        );
        assert_eq!(Id::Num(1), calls[0].id);
    }

    #[tokio::test]
    async fn test_wrong_arity_is_rejected_locally() {
        let provider = RecordingProvider::new();
        let namespace = namespace_with(provider.clone());

        let err = namespace.sign.call(vec![json!(ALICE)]).await.unwrap_err();
        assert!(matches!(
            err,
            RequestError::InvalidNumberOfParams {
                got: 1,
                expected: 2,
                ..
            }
        ));
        assert!(provider.calls().is_empty());
    }

    /// A tiny wallet answering the account namespace in-process.
    #[derive(Debug, Clone, Default)]
    struct MockWallet {
        state: Arc<Mutex<WalletState>>,
    }

    #[derive(Debug, Default)]
    struct WalletState {
        password: Option<String>,
        open: bool,
        unlocked: bool,
        addresses: Vec<String>,
    }

    impl MockWallet {
        fn with_state<T>(&self, f: impl FnOnce(&mut WalletState) -> Result<T>) -> Result<T> {
            let mut state = self
                .state
                .lock()
                .map_err(|_| Error::internal_error())?;
            f(&mut state)
        }
    }

    fn require_unlocked(state: &WalletState) -> Result<()> {
        if !state.open {
            return Err(Error::invalid_params("wallet is not open"));
        }
        if !state.unlocked {
            return Err(Error::invalid_params("wallet is locked"));
        }
        Ok(())
    }

    fn as_password(value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_params("password must be a string"))
    }

    impl AccountNamespaceT for MockWallet {
        fn call(&self, from: Value, to: Value, input: Value, _: Value, _: Value) -> Result<Value> {
            Ok(json!({ "from": from, "to": to, "output": input }))
        }

        fn close_wallet(&self) -> Result<Value> {
            self.with_state(|state| {
                state.open = false;
                state.unlocked = false;
                Ok(Value::Null)
            })
        }

        fn create_account(&self) -> Result<Value> {
            self.with_state(|state| {
                require_unlocked(state)?;
                let address = format!("0x{:040x}", state.addresses.len() + 1);
                state.addresses.push(address.clone());
                Ok(json!(address))
            })
        }

        fn create_code(&self, from: Value, _: Value, _: Value) -> Result<Value> {
            Ok(json!({ "from": from, "contract": BOB }))
        }

        fn create_wallet(&self, password: Value) -> Result<Value> {
            let password = as_password(&password)?;
            self.with_state(|state| {
                state.password = Some(password);
                state.open = true;
                state.unlocked = true;
                Ok(Value::Null)
            })
        }

        fn dump_privkey(&self, address: Value) -> Result<Value> {
            self.with_state(|state| {
                require_unlocked(state)?;
                Ok(json!(format!("privkey-of-{}", address.as_str().unwrap_or_default())))
            })
        }

        fn gas_price(&self) -> Result<Value> {
            Ok(json!("0x3b9aca00"))
        }

        fn get_code(&self, _: Value) -> Result<Value> {
            Ok(json!("0x"))
        }

        fn list_address(&self) -> Result<Value> {
            self.with_state(|state| Ok(json!(state.addresses)))
        }

        fn lock_wallet(&self) -> Result<Value> {
            self.with_state(|state| {
                state.unlocked = false;
                Ok(Value::Null)
            })
        }

        fn open_wallet(&self, password: Value) -> Result<Value> {
            let password = as_password(&password)?;
            self.with_state(|state| {
                if state.password.as_deref() != Some(password.as_str()) {
                    return Err(Error::invalid_params("wrong password"));
                }
                state.open = true;
                Ok(Value::Null)
            })
        }

        fn sign(&self, address: Value, message: Value) -> Result<Value> {
            self.with_state(|state| {
                require_unlocked(state)?;
                Ok(json!({ "signer": address, "message": message }))
            })
        }

        fn transfer(&self, from: Value, to: Value, amount: Value) -> Result<Value> {
            self.with_state(|state| {
                require_unlocked(state)?;
                Ok(json!({ "from": from, "to": to, "amount": amount }))
            })
        }

        fn un_lock_wallet(&self, password: Value) -> Result<Value> {
            let password = as_password(&password)?;
            self.with_state(|state| {
                if !state.open || state.password.as_deref() != Some(password.as_str()) {
                    return Err(Error::invalid_params("cannot unlock wallet"));
                }
                state.unlocked = true;
                Ok(Value::Null)
            })
        }
    }

    #[tokio::test]
    async fn test_wallet_lifecycle_through_local_handler() {
        let provider = LocalProvider::serve(MockWallet::default(), LevelFilter::DEBUG);
        let account = AccountNamespace::new(&RequestManager::new(provider));

        account
            .create_wallet
            .call(vec![json!("hunter2")])
            .await
            .expect("failed createWallet");
        let address = account
            .create_account
            .call(vec![])
            .await
            .expect("failed createAccount");
        assert_eq!(
            json!([address.clone()]),
            account.list_address.call(vec![]).await.expect("failed listAddress")
        );

        account.lock_wallet.call(vec![]).await.expect("failed lockWallet");
        let err = account
            .sign
            .call(vec![address.clone(), json!("0xdeadbeef")])
            .await
            .unwrap_err();
        assert_eq!(Some(-32602), err.rpc_code());

        account
            .un_lock_wallet
            .call(vec![json!("hunter2")])
            .await
            .expect("failed unLockWallet");
        let signed = account
            .sign
            .call(vec![address.clone(), json!("0xdeadbeef")])
            .await
            .expect("failed sign");
        assert_eq!(json!({ "signer": address, "message": "0xdeadbeef" }), signed);

        account.close_wallet.call(vec![]).await.expect("failed closeWallet");
        assert!(account
            .open_wallet
            .call(vec![json!("wrong")])
            .await
            .is_err());
        account
            .open_wallet
            .call(vec![json!("hunter2")])
            .await
            .expect("failed openWallet");
    }

    #[tokio::test]
    async fn test_every_member_reaches_local_handler() {
        let wallet = MockWallet::default();
        let provider = LocalProvider::serve(wallet, LevelFilter::TRACE);
        let account = AccountNamespace::new(&RequestManager::new(provider));

        for method in account.iter() {
            // fresh, unlocked wallet for every call
            account
                .create_wallet
                .call(vec![json!("pw")])
                .await
                .expect("failed createWallet");

            let args = match method.name() {
                "openWallet" | "unLockWallet" | "createWallet" => vec![json!("pw")],
                _ => vec![json!(ALICE); method.param_count()],
            };
            let result = method.call(args).await;
            assert!(
                result.is_ok(),
                "{} failed: {:?}",
                method.remote_call(),
                result
            );
        }
    }

    #[tokio::test]
    async fn test_local_handler_rejects_wrong_arity_server_side() {
        let provider = LocalProvider::serve(MockWallet::default(), LevelFilter::DEBUG);
        let manager = RequestManager::new(provider);

        let err = manager
            .send("account_transfer", vec![json!(ALICE)])
            .await
            .unwrap_err();
        assert_eq!(Some(-32602), err.rpc_code());
    }
}
