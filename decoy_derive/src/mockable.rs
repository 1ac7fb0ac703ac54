// vim: tw=80
//! Code generation for `#[mockable]`
use proc_macro2::{Literal, Span, TokenStream};
use quote::{format_ident, quote};
use std::fmt::Display;
use syn::{
    FnArg, GenericParam, Ident, ItemTrait, LitStr, Pat, ReturnType, TraitItem,
    TraitItemFn, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    spanned::Spanned
};

/// `#[mockable]` attributes: an optional name for the generated struct
struct Attrs {
    name: Option<Ident>,
}

impl Parse for Attrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Attrs { name: None });
        }
        let name = input.parse()?;
        if !input.is_empty() {
            return Err(input.error("expected the name of the mock struct"));
        }
        Ok(Attrs { name: Some(name) })
    }
}

/// Every problem found in the input, so they can all be reported at once.
#[derive(Default)]
struct Errors(Option<syn::Error>);

impl Errors {
    fn push<T: Display>(&mut self, span: Span, msg: T) {
        let e = syn::Error::new(span, msg);
        match &mut self.0 {
            Some(errors) => errors.combine(e),
            None => self.0 = Some(e),
        }
    }
}

fn lit(ident: &Ident) -> LitStr {
    LitStr::new(&ident.unraw().to_string(), ident.span())
}

/// Types that can't be cloned into an owned value and written back.
fn is_unsized(ty: &Type) -> bool {
    match ty {
        Type::Slice(_) | Type::TraitObject(_) => true,
        Type::Path(tp) => tp.qself.is_none() && tp.path.is_ident("str"),
        Type::Paren(p) => is_unsized(&p.elem),
        _ => false
    }
}

/// Generate the trait method that routes one call into the mock object.
fn mock_method(f: &TraitItemFn, errors: &mut Errors) -> TokenStream {
    let sig = &f.sig;
    if let Some(a) = &sig.asyncness {
        errors.push(a.span(), "#[mockable] does not support async methods");
    }
    if let Some(v) = &sig.variadic {
        errors.push(v.span(), "#[mockable] does not support variadic methods");
    }
    for param in sig.generics.params.iter() {
        if !matches!(param, GenericParam::Lifetime(_)) {
            errors.push(param.span(),
                "#[mockable] does not support generic methods");
        }
    }
    if !matches!(sig.inputs.first(), Some(FnArg::Receiver(_))) {
        errors.push(sig.ident.span(),
            "#[mockable] does not support methods without a self receiver");
    }
    if let ReturnType::Type(_, ty) = &sig.output {
        match ty.as_ref() {
            Type::Reference(_) => errors.push(ty.span(),
                "#[mockable] does not support methods that return references"),
            Type::ImplTrait(_) => errors.push(ty.span(),
                "#[mockable] does not support methods that return impl Trait"),
            _ => ()
        }
    }

    let method = lit(&sig.ident);
    let mut call = quote!(self.object.call(#method));
    let mut writebacks = Vec::new();
    let typed = sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(pt) => Some(pt),
        FnArg::Receiver(_) => None,
    });
    for (i, pt) in typed.enumerate() {
        let ident = match pt.pat.as_ref() {
            Pat::Ident(pi) if pi.subpat.is_none() => &pi.ident,
            pat => {
                errors.push(pat.span(),
                    "#[mockable] requires plain identifier arguments");
                continue;
            }
        };
        let name = lit(ident);
        match pt.ty.as_ref() {
            Type::Reference(r) if r.mutability.is_some() => {
                if is_unsized(&r.elem) {
                    errors.push(r.elem.span(),
                        "#[mockable] does not support &mut of unsized types");
                    continue;
                }
                let idx = Literal::usize_unsuffixed(i);
                call = quote!(#call.arg_ref(#name,
                    ::std::clone::Clone::clone(&*#ident)));
                writebacks.push(quote!(*#ident = __decoy_done.take_arg(#idx);));
            }
            Type::Reference(r) => {
                if let Type::TraitObject(_) = r.elem.as_ref() {
                    errors.push(r.elem.span(),
                        "#[mockable] does not support trait object arguments");
                }
                call = quote!(#call.arg(#name,
                    ::std::borrow::ToOwned::to_owned(#ident)));
            }
            Type::ImplTrait(_) => errors.push(pt.ty.span(),
                "#[mockable] does not support impl Trait arguments"),
            _ => call = quote!(#call.arg(#name, #ident)),
        }
    }

    let attrs = f.attrs.iter().filter(|a| a.path().is_ident("cfg"));
    let done = if writebacks.is_empty() {
        quote!(__decoy_done)
    } else {
        quote!(mut __decoy_done)
    };
    quote!(
        #(#attrs)*
        #sig {
            let __decoy_call = #call;
            let #done = self.object.invoke(__decoy_call);
            #(#writebacks)*
            self.object.returned(__decoy_done)
        }
    )
}

fn mock_trait(attrs: Attrs, item: &ItemTrait) -> TokenStream {
    let mut errors = Errors::default();
    for param in item.generics.params.iter() {
        if !matches!(param, GenericParam::Lifetime(_)) {
            errors.push(param.span(),
                "#[mockable] does not support generic traits");
        }
    }
    let mut methods = Vec::new();
    for trait_item in item.items.iter() {
        match trait_item {
            TraitItem::Fn(f) => methods.push(mock_method(f, &mut errors)),
            TraitItem::Type(ty) => errors.push(ty.span(),
                "#[mockable] does not support associated types"),
            TraitItem::Const(c) => errors.push(c.span(),
                "#[mockable] does not support associated constants"),
            x => errors.push(x.span(),
                "#[mockable] does not support this kind of trait item"),
        }
    }
    if let Some(e) = errors.0 {
        let e = e.to_compile_error();
        return quote!(#item #e);
    }

    let vis = &item.vis;
    let ident = &item.ident;
    let unsafety = &item.unsafety;
    let mock_ident = attrs.name
        .unwrap_or_else(|| format_ident!("Mock{}", ident));
    let doc = LitStr::new(&format!("Mock implementation of `{}`", ident),
                          ident.span());
    let (ig, tg, wc) = item.generics.split_for_impl();
    quote!(
        #item
        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #mock_ident {
            object: ::decoy::MockObject,
        }
        impl ::decoy::Mock for #mock_ident {
            fn from_object(object: ::decoy::MockObject) -> Self {
                #mock_ident { object }
            }
            fn mock_object(&self) -> &::decoy::MockObject {
                &self.object
            }
        }
        impl #mock_ident {
            #[allow(dead_code)]
            #vis fn new(mockery: &::decoy::Mockery, name: &str) -> Self {
                mockery.mock(name)
            }
        }
        #unsafety impl #ig #ident #tg for #mock_ident #wc {
            #(#methods)*
        }
    )
}

pub(crate) fn do_mockable(attrs: TokenStream, input: TokenStream)
    -> TokenStream
{
    let attrs: Attrs = match syn::parse2(attrs) {
        Ok(attrs) => attrs,
        Err(err) => {
            let err = err.to_compile_error();
            return quote!(#input #err);
        }
    };
    let item: ItemTrait = match syn::parse2(input.clone()) {
        Ok(item) => item,
        Err(_) => {
            let err = syn::Error::new(Span::call_site(),
                "#[mockable] can only be applied to traits")
                .to_compile_error();
            return quote!(#input #err);
        }
    };
    mock_trait(attrs, &item)
}
