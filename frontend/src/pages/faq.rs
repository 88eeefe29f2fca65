use std::collections::BTreeSet;

use log::info;
use web_sys::{HtmlInputElement, KeyboardEvent, MouseEvent};
use yew::prelude::*;
use yew::Properties;
use yew_hooks::prelude::*;

use crate::components::lead_form::{LeadFormKind, LeadFormView};
use crate::config;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaqEntry {
    pub category: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
}

pub const CATEGORIES: &[(&str, &str)] = &[
    ("general", "General"),
    ("process", "Our Process"),
    ("pricing", "Pricing & Payments"),
    ("technical", "Technical"),
];

pub const FAQ_ENTRIES: &[FaqEntry] = &[
    FaqEntry {
        category: "general",
        question: "What services does WebDev NexServ offer?",
        answer: "We design and build websites, craft brand identities, plan digital strategy and launch e-commerce stores for small and mid-sized businesses.",
    },
    FaqEntry {
        category: "general",
        question: "Do you work with clients outside the US?",
        answer: "Yes. Most of our work happens remotely and we have shipped projects for clients across Europe, Asia and Latin America.",
    },
    FaqEntry {
        category: "process",
        question: "How long does a typical website project take?",
        answer: "A marketing site usually takes 6 to 10 weeks from kickoff to launch. Larger web applications are planned in phases.",
    },
    FaqEntry {
        category: "process",
        question: "What happens after I request a consultation?",
        answer: "We review your answers within 24 hours, schedule a call to go through your goals, and follow up with a proposal covering timeline and pricing.",
    },
    FaqEntry {
        category: "pricing",
        question: "How much does a website cost?",
        answer: "Projects start around $5,000 for a simple site. Custom features, content and integrations move the budget up; the consultation gives you a concrete number.",
    },
    FaqEntry {
        category: "pricing",
        question: "Do you offer payment plans?",
        answer: "Yes. We usually split payment into a deposit at kickoff, a milestone payment at design sign-off and the balance at launch.",
    },
    FaqEntry {
        category: "technical",
        question: "Will my website work on mobile devices?",
        answer: "Every site we build is responsive and tested on current mobile browsers, tablets and desktops.",
    },
    FaqEntry {
        category: "technical",
        question: "Can I update the content myself?",
        answer: "We hand over a content management setup and a short training session so your team can edit pages, posts and products without a developer.",
    },
];

fn search_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Every term must occur in the question or the answer.
pub fn entry_matches(entry: &FaqEntry, query: &str) -> bool {
    let question = entry.question.to_lowercase();
    let answer = entry.answer.to_lowercase();
    search_terms(query)
        .iter()
        .all(|term| question.contains(term.as_str()) || answer.contains(term.as_str()))
}

pub fn visible_entries(entries: &[FaqEntry], query: &str, category: &str) -> Vec<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| category == "all" || entry.category == category)
        .filter(|(_, entry)| entry_matches(entry, query))
        .map(|(index, _)| index)
        .collect()
}

pub fn result_label(count: usize, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        format!("{} questions found", count)
    } else {
        format!("{} questions found for \"{}\"", count, query)
    }
}

/// Which answers are expanded. Opening one closes the others in its category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Accordion {
    open: BTreeSet<usize>,
}

impl Accordion {
    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains(&index)
    }

    pub fn toggle(&mut self, entries: &[FaqEntry], index: usize) {
        if self.open.remove(&index) {
            return;
        }
        if let Some(category) = entries.get(index).map(|entry| entry.category) {
            self.open
                .retain(|other| entries.get(*other).map(|e| e.category) != Some(category));
            self.open.insert(index);
        }
    }

    pub fn expand_all(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.open.extend(indices);
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }
}

#[derive(Properties, PartialEq)]
struct FaqItemProps {
    question: AttrValue,
    answer: AttrValue,
    open: bool,
    on_toggle: Callback<()>,
}

#[function_component(FaqItem)]
fn faq_item(props: &FaqItemProps) -> Html {
    let toggle = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_toggle.emit(());
        })
    };

    html! {
        <div class={classes!("faq-item", props.open.then_some("active"))}>
            <button type="button" class="faq-question" onclick={toggle} aria-expanded={props.open.to_string()}>
                <span class="question-text">{props.question.clone()}</span>
                <span class="faq-toggle">{if props.open { "−" } else { "+" }}</span>
            </button>
            <div class="faq-answer" role="region" aria-hidden={(!props.open).to_string()}>
                if props.open {
                    <p>{props.answer.clone()}</p>
                }
            </div>
        </div>
    }
}

#[function_component(Faq)]
pub fn faq() -> Html {
    let accordion = use_state(Accordion::default);
    let category = use_state(|| "all".to_string());
    let query = use_debounce_state(String::new, config::SEARCH_DEBOUNCE_MS);
    let search_ref = use_node_ref();

    // A fresh search starts with every answer collapsed
    {
        let accordion = accordion.clone();
        use_effect_with_deps(
            move |query: &String| {
                if !query.trim().is_empty() {
                    accordion.set(Accordion::default());
                }
                || ()
            },
            (*query).clone(),
        );
    }

    let visible = visible_entries(FAQ_ENTRIES, &query, &category);

    let oninput = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            query.set(input.value());
        })
    };

    let onkeydown = {
        let query = query.clone();
        let search_ref = search_ref.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                if let Some(input) = search_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
                query.set(String::new());
            }
        })
    };

    let select_category = |id: &'static str| {
        let category = category.clone();
        Callback::from(move |_: MouseEvent| {
            info!("FAQ category selected: {}", id);
            category.set(id.to_string());
        })
    };

    let expand_all = {
        let accordion = accordion.clone();
        let visible = visible.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*accordion).clone();
            next.expand_all(visible.iter().copied());
            accordion.set(next);
        })
    };

    let collapse_all = {
        let accordion = accordion.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*accordion).clone();
            next.collapse_all();
            accordion.set(next);
        })
    };

    let render_item = |index: usize| {
        let entry = FAQ_ENTRIES[index];
        let on_toggle = {
            let accordion = accordion.clone();
            Callback::from(move |_| {
                let mut next = (*accordion).clone();
                next.toggle(FAQ_ENTRIES, index);
                accordion.set(next);
            })
        };
        html! {
            <FaqItem
                key={index}
                question={entry.question}
                answer={entry.answer}
                open={accordion.is_open(index)}
                {on_toggle}
            />
        }
    };

    html! {
        <div class="faq-page">
            <section class="faq-hero">
                <h1>{"Frequently Asked Questions"}</h1>
                <p>{"Everything you need to know about working with WebDev NexServ"}</p>
            </section>

            <section class="faq-controls">
                <input
                    id="faq-search-input"
                    type="search"
                    placeholder="Search questions..."
                    ref={search_ref}
                    {oninput}
                    {onkeydown}
                />
                <p class="result-summary">{result_label(visible.len(), &query)}</p>
                <div class="category-tabs">
                    <button type="button"
                        class={classes!("category-tab", (*category == "all").then_some("active"))}
                        onclick={select_category("all")}
                    >
                        {"All"}
                    </button>
                    { for CATEGORIES.iter().map(|(id, label)| html! {
                        <button type="button"
                            class={classes!("category-tab", (*category == *id).then_some("active"))}
                            onclick={select_category(*id)}
                        >
                            {*label}
                        </button>
                    }) }
                </div>
                <div class="faq-bulk-actions">
                    <button type="button" class="btn btn-secondary" onclick={expand_all}>{"Expand all"}</button>
                    <button type="button" class="btn btn-secondary" onclick={collapse_all}>{"Collapse all"}</button>
                </div>
            </section>

            { for CATEGORIES.iter().map(|(id, label)| {
                let items: Vec<usize> = visible
                    .iter()
                    .copied()
                    .filter(|index| FAQ_ENTRIES[*index].category == *id)
                    .collect();
                if items.is_empty() {
                    html! {}
                } else {
                    html! {
                        <section class="faq-category" id={*id}>
                            <h2>{*label}</h2>
                            { for items.into_iter().map(&render_item) }
                        </section>
                    }
                }
            }) }

            <section class="faq-contact">
                <h2>{"Still have questions?"}</h2>
                <p>{"Send us a quick message and we'll get back to you within one business day."}</p>
                <LeadFormView kind={LeadFormKind::QuickContact} />
            </section>

            <style>
                {r#"
                .faq-page {
                    padding-top: 74px;
                    min-height: 100vh;
                }
                .faq-hero {
                    text-align: center;
                    padding: 6rem 2rem 3rem;
                }
                .faq-controls, .faq-category, .faq-contact {
                    max-width: 800px;
                    margin: 0 auto;
                    padding: 1rem 2rem;
                }
                #faq-search-input {
                    width: 100%;
                    padding: 0.75rem 1rem;
                    border: 2px solid #000;
                    border-radius: 8px;
                }
                .category-tabs {
                    display: flex;
                    flex-wrap: wrap;
                    gap: 0.5rem;
                    margin: 1rem 0;
                }
                .category-tab.active {
                    background: #000;
                    color: #fff;
                }
                .faq-item {
                    border-bottom: 1px solid #e5e5e5;
                }
                .faq-question {
                    width: 100%;
                    display: flex;
                    justify-content: space-between;
                    background: none;
                    border: none;
                    padding: 1.25rem 0;
                    font-size: 1.1rem;
                    text-align: left;
                    cursor: pointer;
                }
                .faq-item.active .faq-answer {
                    padding-bottom: 1.25rem;
                }
                "#}
            </style>
        </div>
    }
}
