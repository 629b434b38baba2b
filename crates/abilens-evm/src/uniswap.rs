//! Uniswap Universal Router `execute` calls.
//!
//! The router takes a command byte string plus one ABI-encoded input per
//! command. The low five bits of each byte select the command; the rest
//! are flags and are ignored here.

use abilens_core::{
    call::{PoolHop, UniswapCommand, UniswapParam, UniswapParamValue, UniswapRouterCall},
    hexutil::{decode_hex_padded, encode_hex, leading_selector},
    types::{DecodedValue, TypeDescriptor},
};
use tracing::debug;

use crate::call_decoder::{decode_params, decode_values};

/// `execute(bytes,bytes[],uint256)`
pub const EXECUTE_WITH_DEADLINE: [u8; 4] = [0x35, 0x93, 0x56, 0x4c];
/// `execute(bytes,bytes[])`
pub const EXECUTE: [u8; 4] = [0x24, 0x85, 0x6b, 0xc3];

const COMMAND_MASK: u8 = 0x1f;
const ADDRESS_LEN: usize = 20;
const FEE_LEN: usize = 3;

/// Known router deployments (mainnet, Arbitrum, Base, Optimism, Polygon, BSC, Avalanche).
pub const UNIVERSAL_ROUTER_ADDRESSES: &[&str] = &[
    "0xef1c6e67703c7bd7107eed8303fbe6ec2554bf6b",
    "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad",
    "0x4c60051384bd2d3c01bfc845cf5f4b44bcbe9de5",
    "0xec8b0f7ffe3ae75d7ffab09429e3675bb63503e4",
    "0x5e325eda8064b456f4781070c0738d849c824258",
    "0xb555edf5dcf85f42ceef1f3630a52a108e55a654",
    "0xcb1355ff08ab38bbce60111f1bb2b784be25d7e8",
    "0x643770e279d5d0733f21d6dc03a8efbabf3255b4",
    "0xec7be89e9d109e7e3fec59c222cf297125fefda2",
    "0x5dc88340e1c5c6366864ee415d6034cadd1a9897",
    "0x4dae2f939acf50408e13d58534ff8c2776d45265",
    "0x82635af6146972cd6601161c4472ffe97237d292",
];

/// Is `address` a known Universal Router deployment? Case-insensitive.
pub fn is_universal_router(address: &str) -> bool {
    let address = address.trim();
    UNIVERSAL_ROUTER_ADDRESSES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(address))
}

// ─── Command table ───────────────────────────────────────────────────────────

struct ParamSpec {
    name: &'static str,
    ty: &'static str,
    description: &'static str,
}

struct CommandSpec {
    name: &'static str,
    params: &'static [ParamSpec],
}

macro_rules! p {
    ($name:expr, $ty:expr, $description:expr $(,)?) => {
        ParamSpec {
            name: $name,
            ty: $ty,
            description: $description,
        }
    };
}

const RECIPIENT: ParamSpec = p!("recipient", "address", "The recipient of the output of the trade");
const PAYER_IS_USER: ParamSpec = p!(
    "payerIsUser",
    "bool",
    "Whether the input tokens come from msg.sender (through Permit2) or are already in the router",
);

fn command_spec(index: u8) -> Option<CommandSpec> {
    // NFT market commands share their first two parameters
    macro_rules! market {
        ($name:literal, $market:literal $(, $extra:expr)* $(,)?) => {
            CommandSpec {
                name: $name,
                params: &[
                    p!("value", "uint256", concat!("The ETH value to forward to the ", $market, " contract")),
                    p!("data", "bytes", concat!("The calldata to use to call the ", $market, " contract")),
                    $($extra),*
                ],
            }
        };
    }

    let spec = match index {
        0x00 => CommandSpec {
            name: "V3_SWAP_EXACT_IN",
            params: &[
                RECIPIENT,
                p!("amountIn", "uint256", "The amount of input tokens for the trade"),
                p!("amountOutMin", "uint256", "The minimum amount of output tokens the user wants"),
                p!("path", "bytes", "The UniswapV3 encoded path to trade along"),
                PAYER_IS_USER,
            ],
        },
        0x01 => CommandSpec {
            name: "V3_SWAP_EXACT_OUT",
            params: &[
                RECIPIENT,
                p!("amountOut", "uint256", "The amount of output tokens to receive"),
                p!("amountInMax", "uint256", "The maximum number of input tokens that should be spent"),
                p!("path", "bytes", "The UniswapV3 encoded path to trade along"),
                PAYER_IS_USER,
            ],
        },
        0x02 => CommandSpec {
            name: "PERMIT2_TRANSFER_FROM",
            params: &[
                p!("token", "address", "The token to fetch from Permit2"),
                p!("recipient", "address", "The recipient of the tokens fetched"),
                p!("amount", "uint256", "The amount of token to fetch"),
            ],
        },
        0x03 => CommandSpec {
            name: "PERMIT2_PERMIT_BATCH",
            params: &[
                p!("batch", "bytes", "A PermitBatch struct outlining all of the Permit2 permits to execute"),
                p!("data", "bytes", "The signature to provide to Permit2"),
            ],
        },
        0x04 => CommandSpec {
            name: "SWEEP",
            params: &[
                p!("token", "address", "The ERC20 token to sweep (or Constants.ETH for ETH)"),
                p!("recipient", "address", "The recipient of the sweep"),
                p!("amountMin", "uint256", "The minimum desired amount"),
            ],
        },
        0x05 => CommandSpec {
            name: "TRANSFER",
            params: &[
                p!("token", "address", "The ERC20 token to transfer (or Constants.ETH for ETH)"),
                p!("recipient", "address", "The recipient of the transfer"),
                p!("value", "uint256", "The amount to transfer"),
            ],
        },
        0x06 => CommandSpec {
            name: "PAY_PORTION",
            params: &[
                p!("token", "address", "The ERC20 token to transfer (or Constants.ETH for ETH)"),
                p!("recipient", "address", "The recipient of the transfer"),
                p!("bips", "uint256", "The proportion of the contract's balance to send, in basis points"),
            ],
        },
        0x08 => CommandSpec {
            name: "V2_SWAP_EXACT_IN",
            params: &[
                RECIPIENT,
                p!("amountIn", "uint256", "The amount of input tokens for the trade"),
                p!("amountOutMin", "uint256", "The minimum amount of output tokens the user wants"),
                p!("path", "address[]", "The UniswapV2 token path to trade along"),
                PAYER_IS_USER,
            ],
        },
        0x09 => CommandSpec {
            name: "V2_SWAP_EXACT_OUT",
            params: &[
                RECIPIENT,
                p!("amountOut", "uint256", "The amount of output tokens to receive"),
                p!("amountInMax", "uint256", "The maximum number of input tokens that should be spent"),
                p!("path", "address[]", "The UniswapV2 token path to trade along"),
                PAYER_IS_USER,
            ],
        },
        0x0a => CommandSpec {
            name: "PERMIT2_PERMIT",
            params: &[
                p!("permitSingle", "bytes", "A PermitSingle struct outlining the Permit2 permit to execute"),
                p!("signature", "bytes", "The signature to provide to Permit2"),
            ],
        },
        0x0b => CommandSpec {
            name: "WRAP_ETH",
            params: &[
                p!("recipient", "address", "The recipient of the WETH"),
                p!("amountMin", "uint256", "The amount of ETH to wrap"),
            ],
        },
        0x0c => CommandSpec {
            name: "UNWRAP_WETH",
            params: &[
                p!("recipient", "address", "The recipient of the ETH"),
                p!("amountMin", "uint256", "The minimum required ETH to receive from the unwrapping"),
            ],
        },
        0x0d => CommandSpec {
            name: "PERMIT2_TRANSFER_FROM_BATCH",
            params: &[p!(
                "batchDetails",
                "bytes",
                "An array of AllowanceTransferDetails structs that each describe a Permit2 transfer to perform",
            )],
        },
        0x10 => market!("SEAPORT", "Seaport"),
        0x11 => market!(
            "LOOKS_RARE_721",
            "LooksRare",
            p!("recipient", "address", "The recipient of the ERC721"),
            p!("token", "address", "The ERC721 token address"),
            p!("id", "uint256", "The ID of the ERC721")
        ),
        0x12 => market!("NFTX", "NFTX"),
        0x13 => CommandSpec {
            name: "CRYPTOPUNKS",
            params: &[
                p!("punkId", "uint256", "The PunkID to purchase"),
                p!("recipient", "address", "The recipient for the cryptopunk"),
                p!("value", "uint256", "The ETH value to forward to the Cryptopunks contract"),
            ],
        },
        0x14 => market!(
            "LOOKS_RARE_1155",
            "LooksRare",
            p!("recipient", "address", "The recipient of the ERC1155"),
            p!("token", "address", "The ERC1155 token address"),
            p!("id", "uint256", "The ID of the ERC1155"),
            p!("amount", "uint256", "The amount of the ERC1155 to transfer")
        ),
        0x15 => CommandSpec {
            name: "OWNER_CHECK_721",
            params: &[
                p!("owner", "address", "The required owner of the ERC721"),
                p!("token", "address", "The ERC721 token address"),
                p!("id", "uint256", "The ID of the ERC721"),
            ],
        },
        0x16 => CommandSpec {
            name: "OWNER_CHECK_1155",
            params: &[
                p!("owner", "address", "The required owner of the ERC1155"),
                p!("token", "address", "The ERC1155 token address"),
                p!("id", "uint256", "The ID of the ERC1155"),
                p!("minBalance", "uint256", "The minimum required balance"),
            ],
        },
        0x17 => CommandSpec {
            name: "SWEEP_ERC721",
            params: &[
                p!("token", "address", "The ERC721 token address to transfer"),
                p!("recipient", "address", "The recipient of the transfer"),
                p!("id", "uint256", "The token ID to transfer"),
            ],
        },
        0x18 => market!(
            "X2Y2_721",
            "X2Y2",
            p!("recipient", "address", "The recipient of the ERC721"),
            p!("token", "address", "The ERC721 token address"),
            p!("id", "uint256", "The ID of the ERC721")
        ),
        0x19 => market!("SUDOSWAP", "Sudoswap"),
        0x1a => market!("NFT20", "NFT20"),
        0x1b => market!(
            "X2Y2_1155",
            "X2Y2",
            p!("recipient", "address", "The recipient of the ERC1155"),
            p!("token", "address", "The ERC1155 token address"),
            p!("id", "uint256", "The ID of the ERC1155"),
            p!("amount", "uint256", "The amount of the ERC1155 to transfer")
        ),
        0x1c => market!(
            "FOUNDATION",
            "Foundation",
            p!("recipient", "address", "The recipient of the ERC721"),
            p!("token", "address", "The ERC721 token address"),
            p!("id", "uint256", "The ID of the ERC721")
        ),
        0x1d => CommandSpec {
            name: "SWEEP_ERC1155",
            params: &[
                p!("token", "address", "The ERC1155 token address to sweep"),
                p!("recipient", "address", "The recipient of the sweep"),
                p!("id", "uint256", "The token ID to sweep"),
                p!("amount", "uint256", "The minimum desired amount"),
            ],
        },
        _ => return None,
    };
    Some(spec)
}

/// Name of the command selected by `command_byte`, ignoring flag bits.
pub fn command_name(command_byte: u8) -> Option<&'static str> {
    command_spec(command_byte & COMMAND_MASK).map(|spec| spec.name)
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Does the calldata start with one of the router's `execute` selectors?
pub fn is_candidate(calldata: &[u8]) -> bool {
    matches!(leading_selector(calldata), Some(s) if s == EXECUTE_WITH_DEADLINE || s == EXECUTE)
}

/// Hex variant of [`is_candidate`]; tolerates a missing `0x` and odd length.
pub fn is_candidate_hex(calldata_hex: &str) -> bool {
    decode_hex_padded(calldata_hex)
        .map(|raw| is_candidate(&raw))
        .unwrap_or(false)
}

/// Decode router calldata given as hex. Odd-length input is right-padded
/// with a `0` nibble and the `0x` prefix is optional.
pub fn decode_hex(calldata_hex: &str) -> Option<UniswapRouterCall> {
    decode_hex_padded(calldata_hex)
        .ok()
        .and_then(|raw| decode(&raw))
}

/// Decode router calldata. `None` when the selector is not an `execute`
/// variant or the outer parameters do not decode.
///
/// Commands whose index is unknown, whose input is missing, or whose input
/// does not decode against the command table are left out of the result.
pub fn decode(calldata: &[u8]) -> Option<UniswapRouterCall> {
    let selector = leading_selector(calldata)?;
    let with_deadline = match selector {
        s if s == EXECUTE_WITH_DEADLINE => true,
        s if s == EXECUTE => false,
        _ => return None,
    };

    let mut outer = vec![
        TypeDescriptor::new("commands", "bytes"),
        TypeDescriptor::new("inputs", "bytes[]"),
    ];
    if with_deadline {
        outer.push(TypeDescriptor::new("deadline", "uint256"));
    }

    let values = match decode_values(&outer, &calldata[4..]) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "universal router outer decode failed");
            return None;
        }
    };

    let commands = hex::decode(values.first()?.as_bytes_hex()?.trim_start_matches("0x")).ok()?;
    let inputs: Vec<Vec<u8>> = match values.get(1)? {
        DecodedValue::Array(items) => items
            .iter()
            .filter_map(|item| item.as_bytes_hex())
            .filter_map(|h| hex::decode(h.trim_start_matches("0x")).ok())
            .collect(),
        _ => return None,
    };
    let deadline = values.get(2).and_then(|v| v.as_number()).map(str::to_string);

    let commands = commands
        .iter()
        .enumerate()
        .filter_map(|(i, &byte)| decode_command(byte, inputs.get(i)?))
        .collect();

    Some(UniswapRouterCall { deadline, commands })
}

fn decode_command(byte: u8, input: &[u8]) -> Option<UniswapCommand> {
    let index = byte & COMMAND_MASK;
    let Some(spec) = command_spec(index) else {
        debug!(index, "unknown universal router command");
        return None;
    };

    let descriptors: Vec<TypeDescriptor> = spec
        .params
        .iter()
        .map(|p| TypeDescriptor::new(p.name, p.ty))
        .collect();
    let decoded = match decode_params(&descriptors, input) {
        Ok(d) => d,
        Err(e) => {
            debug!(command = spec.name, error = %e, "command input does not decode");
            return None;
        }
    };

    let params = spec
        .params
        .iter()
        .zip(decoded)
        .map(|(ps, (_, value))| {
            let value = if ps.name == "path" && ps.ty == "bytes" {
                match value
                    .as_bytes_hex()
                    .and_then(|h| hex::decode(h.trim_start_matches("0x")).ok())
                {
                    Some(raw) => UniswapParamValue::Path(decode_path(&raw)),
                    None => UniswapParamValue::Value(value),
                }
            } else {
                UniswapParamValue::Value(value)
            };
            UniswapParam {
                name: ps.name.to_string(),
                ty: ps.ty.to_string(),
                description: ps.description.to_string(),
                value,
            }
        })
        .collect();

    Some(UniswapCommand {
        index,
        name: spec.name.to_string(),
        params,
    })
}

/// Split a V3 packed path (`token | fee | token | fee | token ...`) into hops.
///
/// Each hop ends at the address that starts the next one. A trailing
/// address without a closing token after it is not a hop.
pub fn decode_path(raw: &[u8]) -> Vec<PoolHop> {
    let mut hops = Vec::new();
    let mut first: Option<String> = None;
    let mut fee: u32 = 0;
    let mut rest = raw;

    loop {
        if rest.len() < ADDRESS_LEN {
            break;
        }
        let address = encode_hex(&rest[..ADDRESS_LEN]);
        rest = &rest[ADDRESS_LEN..];
        if let Some(first_address) = first.take() {
            hops.push(PoolHop {
                first_address,
                tick_spacing: fee,
                second_address: address.clone(),
            });
        }
        first = Some(address);

        if rest.len() < FEE_LEN {
            break;
        }
        fee = u32::from_be_bytes([0, rest[0], rest[1], rest[2]]);
        rest = &rest[FEE_LEN..];
    }

    hops
}
