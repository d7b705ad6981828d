//! Defines the Reflexio runtime macros.

#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

extern crate proc_macro;

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn, ReturnType, Stmt};

/// Macro definition for the Reflexio runtime.
///
/// This macro should be used once only in a project.
/// This macro requires `tokio` as a dependency.
///
/// _Executes the entire function in a blocking thread and provides synchronization for waiting on
/// all subsequently and dynamically created tasks (using `task::run`)._
///
/// # Example
/// ```
/// #[reflexio_macros::runtime]
/// async fn main() {
///     // whatever
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime(_: TokenStream, item: TokenStream) -> TokenStream {
    macro_inner(item, false)
}

/// Same as `#[reflexio_macros::runtime]` but for tests.
#[proc_macro_attribute]
pub fn test(_: TokenStream, item: TokenStream) -> TokenStream {
    macro_inner(item, true)
}

fn macro_inner(item: TokenStream, test: bool) -> TokenStream {
    let reflexio = reflexio_crate_path();

    let input = parse_macro_input!(item as ItemFn);
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    let mut stmts = block.stmts;

    // When the function declares a return type, its trailing expression must be
    // evaluated after all dynamically spawned tasks have been drained.
    let has_return_type = match &sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => {
            !matches!(&**ty, syn::Type::Tuple(tuple) if tuple.elems.is_empty())
        }
    };
    let return_expr = match has_return_type {
        true => match stmts.pop() {
            Some(Stmt::Expr(expr, None)) => Some(expr),
            Some(stmt) => {
                stmts.push(stmt);
                None
            }
            None => None,
        },
        false => None,
    };

    // Define the #[tokio::main] / #[tokio::test] tokio macro attribute.
    let tokio_main_attr = match test {
        true => quote! {
            #[#reflexio::utils::tokio::test]
            #[#reflexio::utils::serial_test::serial]
        },
        false => quote! {
            #[#reflexio::utils::tokio::main]
        },
    };

    let modified_block = quote! {
        {
            // Channel for communicating task completions.
            let (sender, mut receiver) = #reflexio::utils::tokio::sync::mpsc::unbounded_channel::<#reflexio::utils::tokio::task::JoinHandle<()>>();

            // Update the global task sender.
            {
                let mut guard = #reflexio::utils::task::SENDER.write();
                *guard = Some(sender.clone());
            }

            #(#stmts)*

            {
                let mut guard = #reflexio::utils::task::SENDER.write();
                *guard = None;
            }
            drop(sender); // Drop the cloned sender to close the channel.

            // Wait for all dynamically spawned tasks to complete.
            while let Some(handle) = receiver.recv().await {
                handle
                    .await
                    .expect("Failed to join dynamically spawned task");
            }

            #return_expr
        }
    };

    // Reconstruct the function with the modified block.
    let output = quote! {
        #tokio_main_attr
        #(#attrs)*
        #vis #sig
        #modified_block
    };

    output.into()
}

/// Determines what crate name should be used to refer to the reflexio core:
/// `crate::...` or `reflexio::...` depending on the compilation context.
fn reflexio_crate_path() -> syn::Path {
    let is_internal = std::env::var("CARGO_CRATE_NAME")
        .map(|pkg_name| pkg_name == "reflexio")
        .unwrap_or_default();

    #[cfg(doctest)]
    let is_internal = false;

    if is_internal {
        syn::parse_quote!(crate)
    } else {
        syn::parse_quote!(reflexio)
    }
}
