//! Semantic Locators Demo
//!
//! Demonstrates resolving and generating semantic locators:
//! - Role and name matching with wildcards
//! - ARIA attribute constraints
//! - `outer` to skip nested matches
//! - Failure explanations
//! - Batch generation
//!
//! # Running
//!
//! ```bash
//! cargo run --example semantic_locators -p semloc
//! ```

#![allow(clippy::uninlined_format_args)]

use semloc::dom::descendant_elements;
use semloc::prelude::*;

const PAGE: &str = r#"
<nav aria-label="Settings">
  <ul>
    <li><a href="/profile" aria-current="page">Profile</a></li>
    <li><a href="/security">Security</a>
      <ul><li><a href="/security/keys">SSH keys</a></li></ul>
    </li>
  </ul>
</nav>
<main>
  <label><input type="checkbox" checked> Email notifications</label>
  <label><input type="checkbox"> SMS notifications</label>
  <button>Save changes</button>
  <div role="dialog" aria-label="Confirm" hidden><button>Save changes</button></div>
</main>
"#;

fn main() -> SemlocResult<()> {
    println!("=== Semloc Semantic Locators Demo ===\n");

    let doc = Document::parse(PAGE);
    let root = doc.default_root();

    demo_find(root)?;
    demo_outer(root)?;
    demo_failure(root);
    demo_generate(root)?;

    println!("\n=== Semantic Locators Demo Complete ===");
    Ok(())
}

fn show(root: scraper::ElementRef<'_>, locator: &str) -> SemlocResult<()> {
    let found = find_elements_by_semantic_locator(locator, root)?;
    println!("{:<48} -> {} match(es)", locator, found.len());
    for element in found {
        println!("    <{}> {:?}", element.value().name(), semloc::accessible_name(element));
    }
    Ok(())
}

fn demo_find(root: scraper::ElementRef<'_>) -> SemlocResult<()> {
    println!("--- Demo 1: Roles, Names and Attributes ---\n");
    show(root, "{link}")?;
    show(root, "{link 'S*'}")?;
    show(root, "{link current:page}")?;
    show(root, "{checkbox checked:true}")?;
    show(root, "{checkbox '*notifications'}")?;
    println!();
    Ok(())
}

fn demo_outer(root: scraper::ElementRef<'_>) -> SemlocResult<()> {
    println!("--- Demo 2: Outer ---\n");
    show(root, "{navigation} {listitem}")?;
    show(root, "{navigation} outer {listitem}")?;
    println!();
    Ok(())
}

fn demo_failure(root: scraper::ElementRef<'_>) {
    println!("--- Demo 3: Failure Explanations ---\n");
    if let Err(err) = find_element_by_semantic_locator("{dialog 'Confirm'} {button 'Save changes'}", root) {
        println!("{}", err);
    }
    if let Err(err) = parse("{button 'Save}") {
        println!("{}", err);
    }
    println!();
}

fn demo_generate(root: scraper::ElementRef<'_>) -> SemlocResult<()> {
    println!("--- Demo 4: Generation ---\n");
    let elements: Vec<_> = descendant_elements(root).collect();
    let locators = batch_closest_precise_locator_for(&elements, &BatchOptions::default())?;
    for element in &elements {
        if let Some(Some(locator)) = locators.get(&element.id()) {
            println!("    <{:<6}> {}", element.value().name(), locator);
        }
    }
    Ok(())
}
