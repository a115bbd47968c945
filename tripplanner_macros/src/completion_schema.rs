use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{spanned::Spanned, ItemStruct, LitStr};

use crate::schema_extraction::{
    collect_doc_comments, collect_field_docs, ensure_named_struct, infer_description,
    infer_schema_name, parse_completion_schema_args, CompletionSchemaArgs,
};

pub fn completion_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let expanded = parse_completion_schema_args(attr).and_then(|args| {
        let item_struct: ItemStruct = syn::parse(item)?;
        expand(&args, &item_struct)
    });

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: &CompletionSchemaArgs, item: &ItemStruct) -> syn::Result<TokenStream2> {
    ensure_named_struct(item)?;
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "`#[completion_schema]` cannot be applied to generic structs",
        ));
    }

    let ident = &item.ident;
    let meta = schema_meta(args, item);

    Ok(quote! {
        #item

        impl trip_planner::schema::CompletionSchema for #ident {
            fn schema() -> &'static trip_planner::schema::SchemaHandle {
                static HANDLE: std::sync::OnceLock<trip_planner::schema::SchemaHandle> =
                    std::sync::OnceLock::new();
                HANDLE.get_or_init(|| trip_planner::schema::SchemaHandle::for_type::<Self>(#meta))
            }
        }
    })
}

/// `SchemaMeta` literal carrying the name, description and field docs.
fn schema_meta(args: &CompletionSchemaArgs, item: &ItemStruct) -> TokenStream2 {
    let name = infer_schema_name(item, args.name.as_ref());
    let type_name = LitStr::new(&item.ident.to_string(), Span::call_site());

    let description = match infer_description(
        args.description.as_ref(),
        collect_doc_comments(&item.attrs),
    ) {
        Some(text) => quote! { Some(#text) },
        None => quote! { None },
    };

    let field_docs = collect_field_docs(item).into_iter().map(|(field, doc)| {
        let field = LitStr::new(&field, Span::call_site());
        let doc = LitStr::new(&doc, Span::call_site());
        quote! { (#field, #doc) }
    });

    quote! {
        trip_planner::schema::SchemaMeta {
            name: #name,
            type_name: #type_name,
            description: #description,
            field_docs: &[#(#field_docs),*],
        }
    }
}
