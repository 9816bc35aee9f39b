// Items are measured after they render; heights above the viewport keep the content anchored.
use windowed_list::memory::MemoryHost;
use windowed_list::{Config, Host, WindowedScroller};

fn main() {
    let config = Config::default()
        .with_dynamic_heights(true)
        .with_estimated_item_height(40.0)
        .with_restore_scroll(true);
    let mut list = WindowedScroller::new(MemoryHost::new(400.0), 1_000, config, |i| {
        "lorem ipsum ".repeat(1 + i % 5)
    });
    let root = list.host_mut().create_root();
    list.mount(root);
    list.scroll_to(2_000.0);

    // Pretend the host wrapped each row at 30 chars, 18 units per line.
    let batch = list
        .host_mut()
        .measure_with(|text: &String| (text.len() as f64 / 30.0).ceil() * 18.0);
    println!("measured {} rows", batch.len());
    list.handle_sizes(&batch);

    let scroll = list.scroll_node().unwrap_or(root);
    println!(
        "position={} host_position={} total={}",
        list.metrics().position(),
        list.host().scroll_position(scroll),
        list.total_height()
    );
    println!("viewport_range={:?}", list.viewport_range());

    let snapshot = list.scroll_snapshot();
    list.unmount();
    list.mount(root);
    println!(
        "restored: snapshot={snapshot:?} position={}",
        list.metrics().position()
    );
}
