//! `produto`: catalog items and cart pricing.

use serde::{Deserialize, Serialize};

use crate::pricing::{MAX_QUANTITY, line_total};
use crate::validation::ValidationErrors;

/// Catalog item. Static content: user actions never change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// Unit price in cents.
    #[serde(rename = "preco")]
    pub price: i64,
    #[serde(rename = "cores", default)]
    pub colors: Vec<String>,
    #[serde(rename = "tamanhos", default)]
    pub sizes: Vec<String>,
    #[serde(rename = "estoque", default)]
    pub stock: i64,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    fn offers(options: &[String], choice: Option<&str>) -> bool {
        match choice {
            None => options.is_empty(),
            Some(c) => options.iter().any(|o| o.eq_ignore_ascii_case(c)),
        }
    }
}

/// One line of a checkout cart as sent by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub slug: String,
    #[serde(rename = "cor", default)]
    pub color: Option<String>,
    #[serde(rename = "tamanho", default)]
    pub size: Option<String>,
    #[serde(rename = "quantidade", default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteLine {
    pub slug: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// Priced cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub total: i64,
}

impl Quote {
    /// Price `items` against `catalog`, checking variants and stock.
    ///
    /// Errors are keyed `items[i]` so the form can point at the bad line.
    pub fn build(catalog: &[Product], items: &[CartItem]) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if items.is_empty() {
            errors.push("items", "carrinho vazio");
            return Err(errors);
        }

        let mut lines = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let field = format!("items[{i}]");
            let Some(product) = catalog.iter().find(|p| p.active && p.slug == item.slug) else {
                errors.push(&field, format!("produto '{}' indisponível", item.slug));
                continue;
            };
            if !(1..=MAX_QUANTITY).contains(&item.quantity) {
                errors.push(&field, format!("quantidade deve estar entre 1 e {MAX_QUANTITY}"));
                continue;
            }
            if !Product::offers(&product.colors, item.color.as_deref()) {
                errors.push(&field, "cor indisponível");
                continue;
            }
            if !Product::offers(&product.sizes, item.size.as_deref()) {
                errors.push(&field, "tamanho indisponível");
                continue;
            }
            // Stock is per product, summed across variants in this cart.
            let requested = items
                .iter()
                .filter(|other| other.slug == item.slug)
                .try_fold(0_i64, |sum, other| sum.checked_add(other.quantity.max(0)));
            if requested.is_none_or(|n| n > product.stock) {
                errors.push(&field, format!("estoque insuficiente ({})", product.stock));
                continue;
            }
            let subtotal = match line_total(product.price, item.quantity) {
                Ok(subtotal) => subtotal,
                Err(e) => {
                    errors.push(&field, e.to_string());
                    continue;
                }
            };
            lines.push(QuoteLine {
                slug: product.slug.clone(),
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                subtotal,
            });
        }
        errors.into_result()?;

        let Some(total) = lines
            .iter()
            .try_fold(0_i64, |sum, line| sum.checked_add(line.subtotal))
        else {
            let mut overflow = ValidationErrors::new();
            overflow.push("items", "valor total fora do limite");
            return Err(overflow);
        };
        Ok(Self { lines, total })
    }

    /// Short human summary, used as the charge comment.
    pub fn describe(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
