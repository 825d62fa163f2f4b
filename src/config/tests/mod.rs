mod loading_tests;
mod presets_tests;
mod validation_tests;
