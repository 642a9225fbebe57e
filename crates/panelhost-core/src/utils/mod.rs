use std::any::Any;
use std::collections::HashMap;

/// Best-effort text of a panic payload.
pub fn panic_message(panic_obj: &(dyn Any + Send)) -> String {
    if let Some(s_ref) = panic_obj.downcast_ref::<&'static str>() {
        (*s_ref).to_string()
    } else if let Some(s_obj) = panic_obj.downcast_ref::<String>() {
        s_obj.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

/// Messages of an error and all of its sources, outermost first.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

/// Shallow merge: keys in `partial` overwrite keys in `base`.
pub fn merge_config(base: &HashMap<String, String>, partial: &HashMap<String, String>) -> HashMap<String, String> {
    let mut merged = base.clone();
    merged.extend(partial.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests;
