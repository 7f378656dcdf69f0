use syn::{Field, FieldsNamed, Token, Type, punctuated::Punctuated};

/// 确保具名字段结构体包含所需字段，并把它们按给定顺序放在最前
/// - 已存在的同名字段会被复用（保留用户的属性与可见性）
/// - 其余字段保持原始相对顺序
pub(crate) fn ensure_leading_fields(fields_named: &mut FieldsNamed, required: &[(&str, &Type)]) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    for (name, ty) in required.iter() {
        match old_named
            .iter()
            .find(|f| f.ident.as_ref().map(|i| i == *name).unwrap_or(false))
        {
            Some(existing) => new_named.push(existing.clone()),
            None => {
                let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
                let field: Field = syn::parse_quote! { #ident: #ty };
                new_named.push(field);
            }
        }
    }

    for f in old_named.into_iter() {
        let is_required = f
            .ident
            .as_ref()
            .map(|i| required.iter().any(|(n, _)| i == n))
            .unwrap_or(false);
        if !is_required {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}
