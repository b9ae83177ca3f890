use crate::config::SelectorConfig;
use crate::error::ExtractError;
use crate::parsers::CompiledSelectors;
use crate::parsers::product::{
    self, Presence, PriceMarker, parse_price, percentage_from_style, rating_from_percent,
};
use scraper::{ElementRef, Html, Selector};

#[cfg(test)]
mod tests {
    use super::*;

    /// Wraps card markup in a listing fragment
    fn card_doc(inner: &str) -> Html {
        Html::parse_fragment(&format!("<div class=\"product-card\">{inner}</div>"))
    }

    fn card(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse(".product-card").unwrap();
        doc.select(&sel).next().unwrap()
    }

    const TITLE: &str = "<a class=\"product__title\"> Boss DS-1 </a>";
    const RATING: &str =
        "<div class=\"rating-stars\"><div class=\"rating-stars-i\" style=\"width: 80%\"></div></div>";

    #[test]
    fn test_standard_card() {
        let doc = card_doc(&format!(
            "{TITLE}<div class=\"product__price\">2 899 грн</div>{RATING}\
             <div class=\"product-presence presence-in-store\">В наявності</div>\
             <span class=\"product-reviews\">12</span>"
        ));
        let selectors = CompiledSelectors::default();
        let product = product::extract(card(&doc), &selectors).unwrap();

        assert_eq!(product.title, "Boss DS-1");
        assert_eq!(product.price, 2899.0);
        assert_eq!(product.rating, 3);
        assert!(product.presence_in_store);
        assert_eq!(product.num_of_reviews, 12);
    }

    #[test]
    fn test_price_markers() {
        let selectors = CompiledSelectors::default();

        let expected = card_doc(&format!(
            "{TITLE}<div class=\"product__price-expected\">Очікується</div>{RATING}"
        ));
        assert_eq!(
            PriceMarker::resolve(card(&expected), &selectors),
            PriceMarker::Expected
        );
        assert_eq!(product::extract(card(&expected), &selectors).unwrap().price, 0.0);

        let none = card_doc(&format!(
            "{TITLE}<div class=\"product__price none\">—</div>{RATING}"
        ));
        assert_eq!(
            PriceMarker::resolve(card(&none), &selectors),
            PriceMarker::Expected
        );
        assert_eq!(product::extract(card(&none), &selectors).unwrap().price, 0.0);

        let action = card_doc(&format!(
            "{TITLE}<div class=\"product__price product__price-action\">\
             <span class=\"old\">3 500 грн</span><span class=\"new\">2 990 грн</span></div>{RATING}"
        ));
        assert!(matches!(
            PriceMarker::resolve(card(&action), &selectors),
            PriceMarker::OnAction(_)
        ));
        assert_eq!(product::extract(card(&action), &selectors).unwrap().price, 2990.0);

        let standard = card_doc(&format!(
            "{TITLE}<div class=\"product__price\">15 400 грн</div>{RATING}"
        ));
        assert!(matches!(
            PriceMarker::resolve(card(&standard), &selectors),
            PriceMarker::Standard(_)
        ));
        assert_eq!(product::extract(card(&standard), &selectors).unwrap().price, 15400.0);
    }

    #[test]
    fn test_unmatched_price_is_an_error() {
        let selectors = CompiledSelectors::default();
        let doc = card_doc(&format!("{TITLE}{RATING}"));

        assert_eq!(
            PriceMarker::resolve(card(&doc), &selectors),
            PriceMarker::Unmatched
        );
        let err = product::extract(card(&doc), &selectors).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { field: "price", .. }));
    }

    #[test]
    fn test_action_without_discounted_price() {
        let selectors = CompiledSelectors::default();
        let doc = card_doc(&format!(
            "{TITLE}<div class=\"product__price-action\"><span class=\"old\">100 грн</span></div>{RATING}"
        ));
        let err = product::extract(card(&doc), &selectors).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { field: "price", .. }));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1 299 грн").unwrap(), 1299.0);
        assert_eq!(parse_price("  849грн ").unwrap(), 849.0);
        assert_eq!(parse_price("12\u{a0}000 грн").unwrap(), 12000.0);
        assert_eq!(parse_price("99.50 грн").unwrap(), 99.5);
        assert_eq!(parse_price("0").unwrap(), 0.0);

        // Commas are neither decimal nor grouping separators in listed prices
        let bad_prices = ["", "грн", "ціна за запитом", "-5 грн", "inf", "NaN", "1,299 грн", "99,50"];
        for bad in bad_prices {
            assert!(parse_price(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_rating_scale() {
        for p in 0..=100u32 {
            let rating = rating_from_percent(f64::from(p)).unwrap();
            assert_eq!(u32::from(rating), p / 25, "rating for {p}%");
            assert!(rating <= 4);
        }
        assert_eq!(rating_from_percent(100.0).unwrap(), 4);
        assert_eq!(rating_from_percent(99.9).unwrap(), 3);
        assert_eq!(rating_from_percent(24.99).unwrap(), 0);
        assert_eq!(rating_from_percent(25.0).unwrap(), 1);

        assert!(rating_from_percent(100.5).is_err());
        assert!(rating_from_percent(-1.0).is_err());
        assert!(rating_from_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_percentage_from_style() {
        assert_eq!(percentage_from_style("width: 80%").unwrap(), 80.0);
        assert_eq!(percentage_from_style("width:100%;").unwrap(), 100.0);
        assert_eq!(percentage_from_style("width: 66.7%").unwrap(), 66.7);
        assert!(percentage_from_style("width: 80px").is_err());
        assert!(percentage_from_style("").is_err());
    }

    #[test]
    fn test_negative_rating_width_is_an_error() {
        assert_eq!(percentage_from_style("width: -20%").unwrap(), -20.0);

        let selectors = CompiledSelectors::default();
        let doc = card_doc(&format!(
            "{TITLE}<div class=\"product__price\">10 грн</div>\
             <div class=\"rating-stars-i\" style=\"width: -20%\"></div>"
        ));
        let err = product::extract(card(&doc), &selectors).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { field: "rating", .. }));
    }

    #[test]
    fn test_missing_rating_is_an_error() {
        let selectors = CompiledSelectors::default();
        let doc = card_doc(&format!("{TITLE}<div class=\"product__price\">10 грн</div>"));
        let err = product::extract(card(&doc), &selectors).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { field: "rating", .. }));

        let no_style = card_doc(&format!(
            "{TITLE}<div class=\"product__price\">10 грн</div><div class=\"rating-stars-i\"></div>"
        ));
        let err = product::extract(card(&no_style), &selectors).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { field: "rating", .. }));
    }

    #[test]
    fn test_presence() {
        let selectors = CompiledSelectors::default();

        let in_store =
            card_doc("<div class=\"product-presence presence-in-store\">В наявності</div>");
        assert_eq!(Presence::resolve(card(&in_store), &selectors), Presence::InStore);

        let not_in_store =
            card_doc("<div class=\"product-presence presence-not-in-store\">Немає</div>");
        assert_eq!(
            Presence::resolve(card(&not_in_store), &selectors),
            Presence::NotInStore
        );

        let neither = card_doc("<div class=\"product-presence\">Під замовлення</div>");
        assert_eq!(
            Presence::resolve(card(&neither), &selectors),
            Presence::Undetermined
        );
        assert!(!Presence::Undetermined.in_store());
    }

    #[test]
    fn test_presence_label() {
        let selectors = CompiledSelectors::compile(&SelectorConfig {
            in_store_label: Some("В наявності".to_string()),
            ..SelectorConfig::default()
        })
        .unwrap();

        let labelled = card_doc("<div class=\"presence-in-store\"> В наявності </div>");
        assert_eq!(Presence::resolve(card(&labelled), &selectors), Presence::InStore);

        let other = card_doc("<div class=\"presence-in-store\">Очікується</div>");
        assert_eq!(Presence::resolve(card(&other), &selectors), Presence::NotInStore);
    }

    #[test]
    fn test_reviews() {
        let selectors = CompiledSelectors::default();
        let base = format!("{TITLE}<div class=\"product__price\">10 грн</div>{RATING}");

        let none = card_doc(&base);
        assert_eq!(product::extract(card(&none), &selectors).unwrap().num_of_reviews, 0);

        let some = card_doc(&format!("{base}<span class=\"product-reviews\"> 7 </span>"));
        assert_eq!(product::extract(card(&some), &selectors).unwrap().num_of_reviews, 7);

        for text in ["many", "-3", "(4)"] {
            let bad = card_doc(&format!("{base}<span class=\"product-reviews\">{text}</span>"));
            let err = product::extract(card(&bad), &selectors).unwrap_err();
            assert!(
                matches!(err, ExtractError::Parse { field: "num_of_reviews", .. }),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_title_with_inline_markup() {
        let selectors = CompiledSelectors::default();
        let doc = card_doc(&format!(
            "<a class=\"product__title\">Boss DS-<b>1</b>X</a>\
             <div class=\"product__price\">10 грн</div>{RATING}"
        ));
        assert_eq!(product::extract(card(&doc), &selectors).unwrap().title, "Boss DS-1X");
    }

    #[test]
    fn test_missing_title() {
        let selectors = CompiledSelectors::default();

        let absent = card_doc(&format!("<div class=\"product__price\">10 грн</div>{RATING}"));
        assert_eq!(
            product::extract(card(&absent), &selectors).unwrap_err(),
            ExtractError::MissingRequiredField { field: "title" }
        );

        let blank = card_doc(&format!(
            "<a class=\"product__title\">   </a><div class=\"product__price\">10 грн</div>{RATING}"
        ));
        assert_eq!(
            product::extract(card(&blank), &selectors).unwrap_err(),
            ExtractError::MissingRequiredField { field: "title" }
        );
    }
}
