//! Program interface descriptor, loaded from an Anchor IDL or from the compiled program crate

use crate::{
    error::{Result, SmokeError},
    types::Method,
};
use litesvm_exp::CounterError;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::{fs, path::Path, str::FromStr};

/// Default location of the IDL produced by `anchor build`
pub const DEFAULT_IDL_PATH: &str = "target/idl/litesvm_exp.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub discriminator: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: u32,
    pub name: String,
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDescriptor {
    pub name: String,
    pub address: Pubkey,
    pub methods: Vec<MethodDescriptor>,
    pub errors: Vec<ErrorDescriptor>,
}

// Subset of the Anchor 0.30+ IDL layout
#[derive(Deserialize)]
struct Idl {
    address: String,
    metadata: IdlMetadata,
    instructions: Vec<IdlInstruction>,
    #[serde(default)]
    errors: Vec<IdlError>,
}

#[derive(Deserialize)]
struct IdlMetadata {
    name: String,
}

#[derive(Deserialize)]
struct IdlInstruction {
    name: String,
    discriminator: Vec<u8>,
}

#[derive(Deserialize)]
struct IdlError {
    code: u32,
    name: String,
    msg: Option<String>,
}

impl ProgramDescriptor {
    /// Descriptor of the program crate this SDK was built against
    pub fn compiled() -> Self {
        let errors = [CounterError::Overflow, CounterError::Underflow]
            .into_iter()
            .map(|error| ErrorDescriptor {
                code: u32::from(error),
                name: error.name(),
                msg: Some(error.to_string()),
            })
            .collect();

        Self {
            name: "litesvm_exp".to_string(),
            address: litesvm_exp::ID,
            methods: Method::ALL
                .into_iter()
                .map(|method| MethodDescriptor {
                    name: method.name().to_string(),
                    discriminator: method.discriminator().to_vec(),
                })
                .collect(),
            errors,
        }
    }

    pub fn from_idl_str(json: &str) -> Result<Self> {
        let idl: Idl = serde_json::from_str(json)
            .map_err(|e| SmokeError::Resolution(format!("malformed IDL: {e}")))?;

        let address = Pubkey::from_str(&idl.address).map_err(|e| {
            SmokeError::Resolution(format!("IDL address {:?} is invalid: {e}", idl.address))
        })?;

        Ok(Self {
            name: idl.metadata.name,
            address,
            methods: idl
                .instructions
                .into_iter()
                .map(|ix| MethodDescriptor {
                    name: ix.name,
                    discriminator: ix.discriminator,
                })
                .collect(),
            errors: idl
                .errors
                .into_iter()
                .map(|e| ErrorDescriptor {
                    code: e.code,
                    name: e.name,
                    msg: e.msg,
                })
                .collect(),
        })
    }

    pub fn from_idl_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            SmokeError::Resolution(format!("cannot read IDL {}: {e}", path.display()))
        })?;
        Self::from_idl_str(&json)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn error(&self, code: u32) -> Option<&ErrorDescriptor> {
        self.errors.iter().find(|e| e.code == code)
    }

    /// Check that this descriptor describes the program the typed client was compiled against
    pub fn check_compatible(&self) -> Result<()> {
        if self.address != litesvm_exp::ID {
            return Err(SmokeError::Resolution(format!(
                "descriptor address {} does not match compiled program id {}",
                self.address,
                litesvm_exp::ID
            )));
        }

        for method in Method::ALL {
            let described = self.method(method.name()).ok_or_else(|| {
                SmokeError::Resolution(format!("descriptor has no method `{method}`"))
            })?;
            if described.discriminator != method.discriminator() {
                return Err(SmokeError::Resolution(format!(
                    "discriminator of `{method}` differs from the compiled program"
                )));
            }
        }

        Ok(())
    }
}
