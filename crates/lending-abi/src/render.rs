use ethers::{
    abi::Token,
    types::{Bytes, I256},
    utils::to_checksum,
};

/// Renders a decoded token for console output. Integers are printed in
/// decimal exactly as returned, with no unit conversion.
pub fn render_token(token: &Token) -> String {
    match token {
        Token::Address(address) => to_checksum(address, None),
        Token::Uint(value) => value.to_string(),
        Token::Int(raw) => I256::from_raw(*raw).to_string(),
        Token::Bool(value) => value.to_string(),
        Token::String(value) => format!("{:?}", value),
        Token::Bytes(bytes) | Token::FixedBytes(bytes) => Bytes::from(bytes.clone()).to_string(),
        Token::Array(items) | Token::FixedArray(items) => {
            format!("[{}]", render_tokens(items))
        }
        Token::Tuple(items) => format!("({})", render_tokens(items)),
    }
}

/// Renders a list of tokens separated by commas.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(render_token)
        .collect::<Vec<_>>()
        .join(", ")
}
