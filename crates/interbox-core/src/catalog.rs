//! Compiled-in product list served when the database cannot be reached.

use crate::models::Product;

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    slug: &str,
    name: &str,
    description: &str,
    price: i64,
    colors: &[&str],
    sizes: &[&str],
    stock: i64,
) -> Product {
    Product {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
        colors: colors.iter().map(|c| (*c).to_string()).collect(),
        sizes: sizes.iter().map(|s| (*s).to_string()).collect(),
        stock,
        active: true,
        image_url: Some(format!("/images/produtos/{slug}.webp")),
    }
}

/// The fallback catalog.
pub fn fallback_products() -> Vec<Product> {
    const SIZES: &[&str] = &["PP", "P", "M", "G", "GG"];
    vec![
        product(
            "fallback-camiseta",
            "camiseta-oficial",
            "Camiseta Oficial INTERBØX 2025",
            "Dry-fit com estampa oficial do evento.",
            8_990,
            &["preta", "branca"],
            SIZES,
            200,
        ),
        product(
            "fallback-regata",
            "regata-competidor",
            "Regata Competidor",
            "Regata cavada para treino e competição.",
            7_990,
            &["preta", "rosa"],
            SIZES,
            120,
        ),
        product(
            "fallback-bone",
            "bone-trucker",
            "Boné Trucker",
            "Boné ajustável com bordado INTERBØX.",
            6_990,
            &["preto"],
            &[],
            80,
        ),
        product(
            "fallback-squeeze",
            "squeeze",
            "Squeeze 750ml",
            "Garrafa térmica de alumínio.",
            4_990,
            &[],
            &[],
            150,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique_and_sellable() {
        let products = fallback_products();
        let mut slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), products.len());
        assert!(products.iter().all(|p| p.active && p.price > 0 && p.stock > 0));
    }
}
