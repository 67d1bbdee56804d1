use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use syn::{Attribute, Expr, Lit, LitInt, LitStr, UnOp};

/// Names of the traits listed in `#[derive(...)]` attributes (last path segment).
pub fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs {
        if !attr.path().is_ident("derive") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.segments.last() {
                traits.insert(ident.ident.to_string());
            }
            Ok(())
        });
    }

    traits
}

/// Returns `true` when a `#[serde(...)]` attribute already carries the given key.
pub fn has_serde_key(attrs: &[Attribute], key: &str) -> Result<bool, TokenStream> {
    let mut found = false;

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                found = true;
            }
            if meta.input.peek(syn::Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })
        .map_err(|err| err.to_compile_error())?;
    }

    Ok(found)
}

/// Converts a Rust member name to the lower camel case used on the wire.
///
/// Mirrors serde's `rename_all = "camelCase"` for snake case input.
pub fn lower_camel_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for (i, ch) in name.chars().enumerate() {
        if ch == '_' {
            upper_next = i > 0;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// `DuplicateModelId` -> `duplicate_model_id`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn parse_lit_str(expr: &Expr, label: &str) -> Result<LitStr, syn::Error> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(expr, format!("{label} must be a string literal"))),
        },
        _ => Err(syn::Error::new_spanned(expr, format!("{label} must be a string literal"))),
    }
}

/// Parses an integer literal discriminant, accepting a leading minus sign.
pub fn parse_discriminant(expr: &Expr) -> Result<i64, syn::Error> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Int(lit) => lit.base10_parse::<i64>(),
            _ => Err(syn::Error::new_spanned(expr, "discriminant must be an integer literal")),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            parse_discriminant(&unary.expr).map(|value| -value)
        },
        Expr::Group(group) => parse_discriminant(&group.expr),
        Expr::Paren(paren) => parse_discriminant(&paren.expr),
        _ => Err(syn::Error::new_spanned(expr, "discriminant must be an integer literal")),
    }
}

pub fn parse_u32(lit: &LitInt) -> Result<u32, syn::Error> {
    lit.base10_parse::<u32>()
}

pub fn set_once<T>(slot: &mut Option<T>, value: T, span: &impl quote::ToTokens) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new_spanned(span, "Duplicate argument"));
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_cases_snake_members() {
        assert_eq!(lower_camel_case("quantity"), "quantity");
        assert_eq!(lower_camel_case("component_twin"), "componentTwin");
        assert_eq!(lower_camel_case("nested_obj"), "nestedObj");
        assert_eq!(lower_camel_case("guid_id"), "guidId");
        assert_eq!(lower_camel_case("r#type"), "type");
    }

    #[test]
    fn keeps_leading_underscore_out_of_the_name() {
        assert_eq!(lower_camel_case("_hidden_value"), "hiddenValue");
    }

    #[test]
    fn snake_cases_variant_names() {
        assert_eq!(snake_case("DuplicateModelId"), "duplicate_model_id");
        assert_eq!(snake_case("Internal"), "internal");
    }

    #[test]
    fn parses_negative_discriminants() {
        let expr: Expr = syn::parse_quote!(-4);
        assert_eq!(parse_discriminant(&expr).unwrap(), -4);

        let expr: Expr = syn::parse_quote!(12);
        assert_eq!(parse_discriminant(&expr).unwrap(), 12);

        let expr: Expr = syn::parse_quote!(1 + 2);
        assert!(parse_discriminant(&expr).is_err());
    }
}
