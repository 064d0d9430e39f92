mod synthesize;
mod viz_layout;
