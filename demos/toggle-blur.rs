fn main() {
	let event_loop = winit::event_loop::EventLoop::new();

	/* The setting is assigned before the window exists, so it only takes
	 * effect once the element is realized below. */
	let blur = blurbehind::BlurWindow::new();
	let root = blurbehind::Element::framework();
	blur.set(&root, true);

	let window = winit::window::WindowBuilder::new()
		.with_title("Click to toggle blur")
		.with_resizable(true)
		.with_decorations(true)
		.with_transparent(true)
		.with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
		.build(&event_loop).unwrap();
	root.realize_from(&window).unwrap();

	if !blur.is_supported() {
		eprintln!("Blur is not supported on this system.");
	}

	event_loop.run(move |event, _, flow| {
		*flow = winit::event_loop::ControlFlow::Wait;
		match event {
			winit::event::Event::WindowEvent { window_id, event }
			if window_id == window.id() => match event {

				winit::event::WindowEvent::MouseInput {
					state: winit::event::ElementState::Pressed,
					button: winit::event::MouseButton::Left,
					..
				} => {
					let enabled = !blur.get(&root);
					blur.set(&root, enabled);
				},
				winit::event::WindowEvent::CloseRequested => {
					root.close();
					*flow = winit::event_loop::ControlFlow::Exit
				},
				_ => {}
			},
			_ => {}
		}
	})
}
