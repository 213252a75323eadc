use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, FnArg, Ident, ItemFn, Pat, PatType, Type};

fn formatted_arg_error_msg(arg_name: &str, arg_pos: usize, fn_name: &str) -> String {
    format!(
        "Expected argument {} ('{}') to be an integer, for {}",
        arg_pos, arg_name, fn_name
    )
}

/// Turns a function with plain numeric parameters into one callable with an
/// argument slice.
///
/// ```ignore
/// #[reckon_fn]
/// fn hypot(x: f64, y: f64) -> Result<f64, String> {
///     Ok(x.hypot(y))
/// }
/// // expands to `fn hypot(args: &[f64]) -> Result<f64, String>`
/// ```
///
/// Parameters may be `f64` or `i64`. An `i64` parameter rejects arguments
/// with a fractional part. The return type must be `Result<_, String>`.
#[proc_macro_attribute]
pub fn reckon_fn(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: ItemFn) -> syn::Result<TokenStream2> {
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_output = &input.sig.output;
    let fn_body = &input.block;

    let mut arg_extractions = Vec::new();
    for (i, arg) in input.sig.inputs.iter().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
            return Err(syn::Error::new(arg.span(), "methods are not supported"));
        };
        let arg_name = match **pat {
            Pat::Ident(ref ident) => &ident.ident,
            _ => return Err(syn::Error::new(pat.span(), "unsupported pattern")),
        };
        arg_extractions.push(extract_arg(arg_name, ty, i, fn_name)?);
    }

    let args_len = arg_extractions.len();
    Ok(quote! {
        #(#attrs)*
        #vis fn #fn_name(args: &[f64]) #fn_output {
            if args.len() != #args_len {
                return Err(format!("Expected {} arguments, but got {}", #args_len, args.len()));
            }

            #(#arg_extractions)*

            #fn_body
        }
    })
}

fn extract_arg(arg_name: &Ident, ty: &Type, i: usize, fn_name: &Ident) -> syn::Result<TokenStream2> {
    let type_ident = match ty {
        Type::Path(type_path) => type_path.path.get_ident(),
        _ => None,
    };

    match type_ident.map(|ident| ident.to_string()).as_deref() {
        Some("f64") => Ok(quote! {
            let #arg_name: f64 = args[#i];
        }),
        Some("i64") => {
            let err_msg = formatted_arg_error_msg(&arg_name.to_string(), i, &fn_name.to_string());
            Ok(quote! {
                let #arg_name: i64 = {
                    let value = args[#i];
                    if value.fract() != 0.0 || !value.is_finite() {
                        return Err(#err_msg.to_string());
                    }
                    value as i64
                };
            })
        }
        _ => Err(syn::Error::new(
            ty.span(),
            "reckon_fn parameters must be f64 or i64",
        )),
    }
}
