//! Runs against a validator configured through ANCHOR_PROVIDER_URL / ANCHOR_WALLET,
//! e.g. under `anchor test --skip-local-validator` with the program deployed.

use litesvm_exp_sdk::{descriptor::ProgramDescriptor, ExecutionContext, ProgramHandle};

#[tokio::test]
#[ignore = "requires a running validator with litesvm_exp deployed"]
async fn is_initialized() {
    let ctx = ExecutionContext::from_env().unwrap();
    let program = ProgramHandle::resolve(&ctx, ProgramDescriptor::compiled())
        .await
        .unwrap();

    let tx = program.initialize().await.unwrap();
    println!("Your transaction signature {tx}");
    assert!(!tx.signature.to_string().is_empty());
}
