#[cfg(test)]
mod pipeline {
    mod integration;
    mod support;
}
