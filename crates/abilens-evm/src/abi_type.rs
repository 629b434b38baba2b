//! `TypeDescriptor` → alloy `DynSolType`.

use alloy_core::dyn_abi::DynSolType;
use abilens_core::{error::DecodeError, types::TypeDescriptor};

/// Build the ABI type for a descriptor, including any array suffix.
pub fn to_sol_type(desc: &TypeDescriptor) -> Result<DynSolType, DecodeError> {
    let base = if desc.is_tuple() {
        let members = desc
            .components
            .iter()
            .map(to_sol_type)
            .collect::<Result<Vec<_>, _>>()?;
        DynSolType::Tuple(members)
    } else {
        let name = TypeDescriptor::new("", desc.base_kind()).canonical_type();
        DynSolType::parse(&name).map_err(|e| DecodeError::InvalidType {
            ty: desc.kind.clone(),
            reason: e.to_string(),
        })?
    };
    wrap_array_suffix(base, desc.array_suffix()).map_err(|reason| DecodeError::InvalidType {
        ty: desc.kind.clone(),
        reason,
    })
}

/// The param-list type for a function's inputs.
pub fn to_params_type(inputs: &[TypeDescriptor]) -> Result<DynSolType, DecodeError> {
    Ok(DynSolType::Tuple(
        inputs.iter().map(to_sol_type).collect::<Result<Vec<_>, _>>()?,
    ))
}

/// Apply `[]` / `[N]` dimensions left to right, so `T[2][]` is a dynamic array of `T[2]`.
fn wrap_array_suffix(mut ty: DynSolType, suffix: &str) -> Result<DynSolType, String> {
    let mut rest = suffix;
    while let Some(open) = rest.strip_prefix('[') {
        let close = open
            .find(']')
            .ok_or_else(|| format!("unterminated array suffix '{suffix}'"))?;
        let len = open[..close].trim();
        ty = if len.is_empty() {
            DynSolType::Array(Box::new(ty))
        } else {
            let n: usize = len
                .parse()
                .map_err(|_| format!("invalid array length '{len}'"))?;
            DynSolType::FixedArray(Box::new(ty), n)
        };
        rest = &open[close + 1..];
    }
    if rest.is_empty() {
        Ok(ty)
    } else {
        Err(format!("trailing characters after array suffix: '{rest}'"))
    }
}
