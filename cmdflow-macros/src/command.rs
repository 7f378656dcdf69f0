use crate::field_utils::ensure_leading_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Item, ItemStruct, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[command] 宏实现
/// - 若缺失则追加字段 `core: CommandCore`，并置于字段最前
/// - 自动实现 `::cmdflow_core::command::CommandBase`
/// - 支持参数：`#[command(name = "...")]`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as CommandAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[command] only on struct")
                .to_compile_error()
                .into();
        }
    };

    // 仅支持具名字段结构体
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let core_ty: Type = syn::parse_quote! { ::cmdflow_core::command::CommandCore };
    ensure_leading_fields(fields_named, &[("core", &core_ty)]);

    let out_struct = ItemStruct { ..st };

    let ident = &out_struct.ident;
    let name = cfg
        .name
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.to_string());
    let generics = out_struct.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        #out_struct

        impl #impl_generics ::cmdflow_core::command::CommandBase for #ident #ty_generics #where_clause {
            fn core(&self) -> &::cmdflow_core::command::CommandCore {
                &self.core
            }

            fn name(&self) -> &'static str {
                #name
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct CommandAttrConfig {
    name: Option<LitStr>,
}

impl Parse for CommandAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut name: Option<LitStr> = None;

        if input.is_empty() {
            return Ok(Self { name });
        }

        let elems: Punctuated<CommandAttrElem, Token![,]> =
            Punctuated::<CommandAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            match elem {
                CommandAttrElem::Name(lit) => {
                    if name.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    name = Some(lit);
                }
            }
        }

        Ok(Self { name })
    }
}

enum CommandAttrElem {
    Name(LitStr),
}

impl Parse for CommandAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        if key == "name" {
            let _eq: Token![=] = input.parse()?;
            let expr: syn::Expr = input.parse()?;
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Ok(CommandAttrElem::Name(s)),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'name'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name'",
            ))
        }
    }
}
