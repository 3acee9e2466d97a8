//! Compile-time fixed-point literals.
//!
//! Protocol parameters such as rates and factors are 18-decimal mantissas.
//! Writing them as `uint256!(0.03e18)` keeps the human-readable value next
//! to the exact integer that ends up on chain.

use ethers::types::U256;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, LitFloat, LitInt, Result,
};

/// A decimal literal split into its digits and its decimal exponent.
struct Number {
    digits: String,
    span: proc_macro2::Span,
}

impl Parse for Number {
    fn parse(input: ParseStream) -> Result<Self> {
        let span = input.span();
        let digits = if input.peek(LitFloat) {
            input.parse::<LitFloat>()?.base10_digits().to_string()
        } else if input.peek(LitInt) {
            input.parse::<LitInt>()?.base10_digits().to_string()
        } else {
            return Err(input.error("expected a float or an integer literal"));
        };
        Ok(Self { digits, span })
    }
}

impl Number {
    /// Evaluates the literal as an unsigned 256-bit integer. Fails if the
    /// literal has more fractional digits than its exponent can absorb or
    /// if the result doesn't fit.
    fn to_u256(&self) -> Result<U256> {
        let (significand, exponent) = match self.digits.split_once('e') {
            Some((significand, exponent)) => {
                let exponent = exponent
                    .parse::<usize>()
                    .map_err(|_| syn::Error::new(self.span, "invalid exponent"))?;
                (significand, exponent)
            }
            None => (self.digits.as_str(), 0),
        };
        let (whole, fraction) = significand.split_once('.').unwrap_or((significand, ""));
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > exponent {
            return Err(syn::Error::new(
                self.span,
                "uint256!: literal is not an integer after scaling",
            ));
        }

        let mut value = U256::zero();
        for c in whole.chars().chain(fraction.chars()) {
            let d = c
                .to_digit(10)
                .ok_or_else(|| syn::Error::new(self.span, format!("unexpected character: {c}")))?;
            value = value
                .checked_mul(U256::from(10))
                .and_then(|v| v.checked_add(U256::from(d)))
                .ok_or_else(|| syn::Error::new(self.span, "uint256!: overflow"))?;
        }
        let scale = U256::from(10)
            .checked_pow(U256::from(exponent - fraction.len()))
            .ok_or_else(|| syn::Error::new(self.span, "uint256!: overflow"))?;
        value
            .checked_mul(scale)
            .ok_or_else(|| syn::Error::new(self.span, "uint256!: overflow"))
    }
}

/// Expands a decimal literal like `0.95e18` into the exact `U256` it denotes.
#[proc_macro]
pub fn uint256(input: TokenStream) -> TokenStream {
    let number = parse_macro_input!(input as Number);
    match number.to_u256() {
        Ok(value) => {
            let bytes: [u8; 32] = value.into();
            quote!(::ethers::types::U256::from([ #(#bytes),* ])).into()
        }
        Err(err) => err.to_compile_error().into(),
    }
}
