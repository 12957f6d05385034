use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{Price, Record};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::cleaner::{coerce_price, normalize_digits, normalize_price_text};

/// Items the listing view renders per page. Only used to turn the item count into a page count.
pub const PAGE_SIZE: u64 = 30;

// ── Price layout ──────────────────────────────────────────────────────────────

/// What the price block of a card shows, decided by how many paragraphs it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLayout {
    /// No price paragraphs: the item has left sale.
    OutOfStock,
    SinglePrice(String),
    /// Discounted price first, struck-through regular price second.
    PromoPair { promo: String, regular: String },
}

impl PriceLayout {
    /// Classify the raw paragraph texts of a price block.
    pub fn classify(paragraphs: &[String]) -> Self {
        match paragraphs {
            [] => PriceLayout::OutOfStock,
            [single] => PriceLayout::SinglePrice(normalize_price_text(single)),
            [promo, regular] => PriceLayout::PromoPair {
                promo: normalize_price_text(promo),
                regular: normalize_price_text(regular),
            },
            [first, ..] => {
                warn!("{} price paragraphs, keeping the first only", paragraphs.len());
                PriceLayout::SinglePrice(normalize_price_text(first))
            }
        }
    }

    /// Resolve into the `(price, promo_price)` columns.
    pub fn into_columns(self) -> Result<(Price, Price)> {
        match self {
            PriceLayout::OutOfStock => Ok((Price::NotAvailable, Price::Empty)),
            PriceLayout::SinglePrice(price) => Ok((coerce_price("price", &price)?, Price::Empty)),
            PriceLayout::PromoPair { promo, regular } => Ok((
                coerce_price("price", &regular)?,
                coerce_price("promo_price", &promo)?,
            )),
        }
    }
}

// ── Listing parser ────────────────────────────────────────────────────────────

pub struct ListingParser {
    grid: Selector,
    info: Selector,
    anchor: Selector,
    paragraph: Selector,
    side_panel: Selector,
    button: Selector,
    label: Selector,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

impl ListingParser {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            grid: compile(&config.grid_selector)?,
            info: compile(&config.info_selector)?,
            anchor: compile("a")?,
            paragraph: compile("p")?,
            side_panel: compile("aside")?,
            button: compile("button")?,
            label: compile("span")?,
        })
    }

    /// Records of every card on the page, in document order. One bad card fails the page.
    pub fn records(&self, doc: &Html) -> Result<Vec<Record>> {
        self.item_fragments(doc)?
            .into_iter()
            .map(|fragment| self.extract_record(fragment))
            .collect()
    }

    /// Direct child elements of the item grid, in document order.
    pub fn item_fragments<'a>(&self, doc: &'a Html) -> Result<Vec<ElementRef<'a>>> {
        let grid = doc
            .select(&self.grid)
            .next()
            .ok_or_else(|| ScrapeError::structure("item grid not found"))?;

        let fragments: Vec<_> = grid.children().filter_map(ElementRef::wrap).collect();
        debug!("{} item fragments", fragments.len());
        Ok(fragments)
    }

    /// Page count from the item total shown on the last side-panel button.
    pub fn total_pages(&self, doc: &Html) -> Result<u32> {
        let panel = doc
            .select(&self.side_panel)
            .next()
            .ok_or_else(|| ScrapeError::structure("side panel not found"))?;
        let button = panel
            .select(&self.button)
            .last()
            .ok_or_else(|| ScrapeError::structure("side panel has no buttons"))?;
        let label = button
            .select(&self.label)
            .next()
            .ok_or_else(|| ScrapeError::structure("item count label not found"))?;

        let items = normalize_digits("item count", &element_text(label))?;
        let pages = items.div_ceil(PAGE_SIZE);
        debug!("{} items → {} pages", items, pages);
        u32::try_from(pages).map_err(|_| ScrapeError::format("item count", items.to_string()))
    }

    /// Build the record for a single product card.
    pub fn extract_record(&self, fragment: ElementRef<'_>) -> Result<Record> {
        let link = fragment
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| ScrapeError::structure("item has no product link"))?
            .to_string();
        let id = normalize_digits("id", &link)?;

        let mut info = fragment.select(&self.info);
        let (Some(title_block), Some(price_block)) = (info.next(), info.next()) else {
            return Err(ScrapeError::structure(format!("item {id}: info blocks missing")));
        };

        let title = title_block
            .select(&self.paragraph)
            .next()
            .map(element_text)
            .ok_or_else(|| ScrapeError::structure(format!("item {id}: no title")))?;

        let paragraphs: Vec<String> = price_block.select(&self.paragraph).map(element_text).collect();
        let (price, promo_price) = PriceLayout::classify(&paragraphs).into_columns()?;

        Ok(Record { id, title, price, promo_price, link })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ListingParser {
        ListingParser::new(&ScraperConfig::default()).unwrap()
    }

    fn card(id: u32, title: &str, prices: &[&str]) -> String {
        let prices: String = prices.iter().map(|p| format!("<p>{p}</p>")).collect();
        format!(
            r#"<div class="card"><a href="https://www.detmir.ru/product/index/id/{id}/">
               <div class="RQ"><p>{title}</p><span>rating</span></div>
               <div class="RQ">{prices}</div></a></div>"#
        )
    }

    fn page(cards: &[String], count_label: &str) -> String {
        format!(
            r#"<html><body>
               <aside><button><span>Акции</span></button><button><span>{count_label}</span></button></aside>
               <div class="xm">{}</div>
               </body></html>"#,
            cards.concat()
        )
    }

    fn records(html: &str) -> Result<Vec<Record>> {
        parser().records(&Html::parse_document(html))
    }

    fn total_pages(html: &str) -> Result<u32> {
        parser().total_pages(&Html::parse_document(html))
    }

    fn first_record(card_html: String) -> Record {
        records(&page(&[card_html], "1")).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn test_out_of_stock_item() {
        let r = first_record(card(3985244, "Кукла Barbie", &[]));
        assert_eq!(r.id, 3985244);
        assert_eq!(r.price, Price::NotAvailable);
        assert_eq!(r.promo_price, Price::Empty);
        assert!(r.is_out_of_stock());
    }

    #[test]
    fn test_single_price_item() {
        let r = first_record(card(7, "Кукла", &["2599\u{a0}₽"]));
        assert_eq!(r.price, Price::Amount(2599));
        assert_eq!(r.promo_price, Price::Empty);

        let r = first_record(card(7, "Кукла", &["2599 ₽"]));
        assert_eq!(r.price, Price::Amount(2599));
    }

    #[test]
    fn test_promo_pair_item() {
        let r = first_record(card(8, "Кукла", &["1\u{2009}999\u{a0}₽", "2\u{2009}599\u{a0}₽"]));
        assert_eq!(r.promo_price, Price::Amount(1999));
        assert_eq!(r.price, Price::Amount(2599));
        assert!(r.has_promo());
    }

    #[test]
    fn test_unclean_price_text_is_kept() {
        let r = first_record(card(10, "Кукла", &["1 999 ₽"]));
        assert_eq!(r.price, Price::Text("1 999 ".into()));
        assert_eq!(r.promo_price, Price::Empty);

        let r = first_record(card(11, "Кукла", &["от 99,90₽", "1 999 ₽"]));
        assert_eq!(r.promo_price, Price::Text("от 99,90".into()));
        assert_eq!(r.price, Price::Text("1 999 ".into()));
    }

    #[test]
    fn test_price_without_digits_is_format_error() {
        let err = records(&page(&[card(12, "Кукла", &["Скоро"])], "1")).unwrap_err();
        assert!(matches!(err, ScrapeError::Format { field: "price", .. }));
    }

    #[test]
    fn test_title_and_link_verbatim() {
        let r = first_record(card(3985244, "Кукла Barbie Безграничные движения  1 GXF04", &["2599"]));
        assert_eq!(r.title, "Кукла Barbie Безграничные движения  1 GXF04");
        assert_eq!(r.link, "https://www.detmir.ru/product/index/id/3985244/");
    }

    #[test]
    fn test_classify_ignores_extra_paragraphs() {
        let paragraphs = vec!["100".to_string(), "200".to_string(), "300".to_string()];
        assert_eq!(
            PriceLayout::classify(&paragraphs),
            PriceLayout::SinglePrice("100".into())
        );
        assert_eq!(
            PriceLayout::classify(&paragraphs).into_columns().unwrap(),
            (Price::Amount(100), Price::Empty)
        );
    }

    #[test]
    fn test_blank_single_price_is_empty() {
        let r = first_record(card(9, "Кукла", &["₽"]));
        assert_eq!(r.price, Price::Empty);
    }

    #[test]
    fn test_fragments_in_document_order() {
        let cards = [card(1, "a", &["10"]), card(2, "b", &[]), card(3, "c", &["5", "9"])];
        let ids: Vec<u64> = records(&page(&cards, "3")).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(&page(&[], "Все товары 95")).unwrap(), 4);
        assert_eq!(total_pages(&page(&[], "90")).unwrap(), 3);
    }

    #[test]
    fn test_missing_grid_is_structure_error() {
        let err = records("<html><body><p>503</p></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(_)));
    }

    #[test]
    fn test_missing_side_panel_is_structure_error() {
        let err = total_pages(r#"<div class="xm"></div>"#).unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(_)));
    }

    #[test]
    fn test_count_label_without_digits_is_format_error() {
        let err = total_pages(&page(&[], "Все товары")).unwrap_err();
        assert!(matches!(err, ScrapeError::Format { field: "item count", .. }));
    }

    #[test]
    fn test_link_without_digits_is_format_error() {
        let html = page(
            &[r#"<div><a href="/product/"><div class="RQ"><p>t</p></div><div class="RQ"></div></a></div>"#
                .to_string()],
            "1",
        );
        let err = records(&html).unwrap_err();
        assert!(matches!(err, ScrapeError::Format { field: "id", .. }));
    }

    #[test]
    fn test_card_without_price_block_is_structure_error() {
        let html = page(
            &[r#"<div><a href="/id/5/"><div class="RQ"><p>t</p></div></a></div>"#.to_string()],
            "1",
        );
        let err = records(&html).unwrap_err();
        assert!(matches!(err, ScrapeError::Structure(_)));
    }
}
