/// Declares an operation: one named method signature that can be called
/// through an [`Any`](crate::Any).
///
/// The macro takes a trait with a single method and generates:
///
/// - the capability trait itself, which concrete types implement;
/// - a trait named after it with an `Ext` suffix, implemented for every
///   [`Any`](crate::Any) whose interface lists the operation. This is the
///   call surface of the wrapper, so it has to be in scope at the call site;
/// - a hidden token type with an `Operation` suffix, which is what
///   [`interface!`](crate::interface!) refers to.
///
/// ## Receivers
///
/// The receiver decides which wrappers can call the operation:
///
/// | Receiver    | Available on                                   |
/// |-------------|------------------------------------------------|
/// | `&self`     | every [`Any`](crate::Any)                      |
/// | `&mut self` | `Any<_, _, Owned>` and `Any<_, _, Exclusive>`  |
/// | `self`      | `Any<_, _, Owned>`, consuming the wrapper      |
///
/// Several operations may share a method name as long as they differ in
/// receiver. Rust's method resolution then picks the entry from the way the
/// wrapper is used: `any.get()` on a place prefers `&self`, `(&mut any).get()`
/// reaches the `&mut self` entry and `any.get()` on a wrapper implementing a
/// `self` entry consumes it.
///
/// ## Generic operations
///
/// An operation may be generic over types. Each instantiation listed in an
/// interface becomes its own entry, and the argument types select among them
/// at the call site.
///
/// ## Return conversion
///
/// A return type written `impl Convert<R>` lets the implementing type return
/// anything implementing [`Convert<R>`](crate::Convert). The wrapper returns
/// `R`.
///
/// ## Limitations
///
/// An operation returning a reference must not take other reference
/// arguments, since the returned borrow is always tied to the receiver.
///
/// # Examples
///
/// ```
/// use raspberry::prelude::*;
///
/// operation! {
///     /// Stores a value.
///     pub trait Store<V> {
///         fn store(&mut self, value: V);
///     }
/// }
///
/// operation! {
///     pub trait Total {
///         fn total(&self) -> impl Convert<i32>;
///     }
/// }
///
/// interface! {
///     pub struct Accumulator { Store<i64>, Store<f64>, Total }
/// }
///
/// #[derive(Default)]
/// struct Sum(f64);
///
/// impl Store<i64> for Sum {
///     fn store(&mut self, value: i64) {
///         self.0 += value as f64;
///     }
/// }
///
/// impl Store<f64> for Sum {
///     fn store(&mut self, value: f64) {
///         self.0 += value;
///     }
/// }
///
/// impl Total for Sum {
///     fn total(&self) -> impl Convert<i32> {
///         self.0
///     }
/// }
///
/// let mut acc: Any<'_, Accumulator> = Any::new(Sum::default());
/// acc.store(2_i64);
/// acc.store(1.5_f64);
/// assert_eq!(acc.total(), 3);
/// ```
#[macro_export]
macro_rules! operation {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident $(< $($gen:ident),+ $(,)? >)? {
            $(#[$method_meta:meta])*
            fn $method:ident ( $($params:tt)* ) $($signature:tt)*
        }
    ) => {
        $crate::operation!(@receiver
            [[$(#[$meta])*] [$vis] $name [$($($gen),+)?] [$(#[$method_meta])*] $method]
            [$($signature)*]
            ($($params)*)
        );
    };

    (@receiver $header:tt $signature:tt (&self $(, $arg:ident : $arg_ty:ty)* $(,)?)) => {
        $crate::operation!(@returns $header by_ref [&self] [$($arg : $arg_ty),*] $signature);
    };
    (@receiver $header:tt $signature:tt (&mut self $(, $arg:ident : $arg_ty:ty)* $(,)?)) => {
        $crate::operation!(@returns $header by_mut [&mut self] [$($arg : $arg_ty),*] $signature);
    };
    (@receiver $header:tt $signature:tt (self $(, $arg:ident : $arg_ty:ty)* $(,)?)) => {
        $crate::operation!(@returns $header by_value [self] [$($arg : $arg_ty),*] $signature);
    };

    (@returns $header:tt $kind:ident $recv:tt $args:tt [-> impl Convert<$ret:ty>;]) => {
        $crate::operation!(@define $header $kind $recv $args [$ret] convert);
    };
    (@returns $header:tt $kind:ident $recv:tt $args:tt [-> $ret:ty;]) => {
        $crate::operation!(@define $header $kind $recv $args [$ret] plain);
    };
    (@returns $header:tt $kind:ident $recv:tt $args:tt [;]) => {
        $crate::operation!(@define $header $kind $recv $args [()] plain);
    };

    (@define
        [[$(#[$meta:meta])*] [$vis:vis] $name:ident [$($gen:ident),*] [$(#[$method_meta:meta])*] $method:ident]
        $kind:ident [$($recv:tt)+] [$($arg:ident : $arg_ty:ty),*] [$ret:ty] $conv:ident
    ) => {
        $crate::operation!(@capability
            [$(#[$meta])*] [$vis] $name [$($gen),*] [$(#[$method_meta])*] $method
            [$($recv)+] [$($arg : $arg_ty),*] [$ret] $conv
        );

        $crate::__private::paste! {
            /// Calls the operation on wrappers whose interface lists it.
            $vis trait [<$name Ext>]<$($gen),*> {
                $(#[$method_meta])*
                fn $method($($recv)+, $($arg: $arg_ty),*) -> $ret;
            }

            #[doc(hidden)]
            #[allow(dead_code)]
            $vis struct [<$name Operation>]<$($gen),*>(
                $crate::__private::PhantomData<fn() -> ($($gen,)*)>,
            );

            impl<$($gen: 'static),*> $crate::Operation for [<$name Operation>]<$($gen),*> {
                type Entry = $crate::operation!(@entry_type $kind [$($arg_ty),*] [$ret]);
            }

            impl<$($gen: 'static),*> [<$name Operation>]<$($gen),*> {
                $crate::operation!(@entry_fn $kind $name [$($gen),*] $method [$($arg : $arg_ty),*] [$ret] $conv);
            }

            impl<__T, $($gen: 'static),*> $crate::OperationFor<__T> for [<$name Operation>]<$($gen),*>
            where
                __T: $name<$($gen),*> + 'static,
            {
                const ENTRY: <Self as $crate::Operation>::Entry = Self::__entry::<__T>;
            }
        }

        $crate::operation!(@ext_impl $kind $name [$($gen),*] $method [$($arg : $arg_ty),*] [$ret]);
    };

    (@capability
        [$(#[$meta:meta])*] [$vis:vis] $name:ident [$($gen:ident),*] [$(#[$method_meta:meta])*] $method:ident
        [$($recv:tt)+] [$($arg:ident : $arg_ty:ty),*] [$ret:ty] plain
    ) => {
        $(#[$meta])*
        $vis trait $name<$($gen),*> {
            $(#[$method_meta])*
            fn $method($($recv)+, $($arg: $arg_ty),*) -> $ret;
        }
    };
    (@capability
        [$(#[$meta:meta])*] [$vis:vis] $name:ident [$($gen:ident),*] [$(#[$method_meta:meta])*] $method:ident
        [$($recv:tt)+] [$($arg:ident : $arg_ty:ty),*] [$ret:ty] convert
    ) => {
        $(#[$meta])*
        $vis trait $name<$($gen),*> {
            $(#[$method_meta])*
            fn $method($($recv)+, $($arg: $arg_ty),*) -> impl $crate::Convert<$ret>;
        }
    };

    (@entry_type by_ref [$($arg_ty:ty),*] [$ret:ty]) => {
        unsafe fn($crate::__private::RawStorageRef<'_>, $($arg_ty),*) -> $ret
    };
    (@entry_type by_mut [$($arg_ty:ty),*] [$ret:ty]) => {
        unsafe fn($crate::__private::RawStorageMut<'_>, $($arg_ty),*) -> $ret
    };
    (@entry_type by_value [$($arg_ty:ty),*] [$ret:ty]) => {
        unsafe fn($crate::__private::RawStorage, $($arg_ty),*) -> $ret
    };

    (@entry_fn by_ref $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty] $conv:ident) => {
        /// Calls the operation on an erased `__T`.
        ///
        /// # Safety
        ///
        /// The caller must ensure that the storage holds a `__T`.
        #[doc(hidden)]
        #[inline]
        unsafe fn __entry<__T: $name<$($gen),*> + 'static>(
            this: $crate::__private::RawStorageRef<'_>,
            $($arg: $arg_ty),*
        ) -> $ret {
            // SAFETY: Guaranteed by the caller
            let this: &__T = unsafe { this.downcast_unchecked::<__T>() };
            $crate::operation!(@call $conv [$ret] (<__T as $name<$($gen),*>>::$method(this, $($arg),*)))
        }
    };
    (@entry_fn by_mut $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty] $conv:ident) => {
        /// Calls the operation on an erased `__T`.
        ///
        /// # Safety
        ///
        /// The caller must ensure that the storage holds a `__T`.
        #[doc(hidden)]
        #[inline]
        unsafe fn __entry<__T: $name<$($gen),*> + 'static>(
            this: $crate::__private::RawStorageMut<'_>,
            $($arg: $arg_ty),*
        ) -> $ret {
            // SAFETY: Guaranteed by the caller
            let this: &mut __T = unsafe { this.downcast_unchecked::<__T>() };
            $crate::operation!(@call $conv [$ret] (<__T as $name<$($gen),*>>::$method(this, $($arg),*)))
        }
    };
    (@entry_fn by_value $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty] $conv:ident) => {
        /// Calls the operation on an erased `__T`, moving it out of the
        /// storage.
        ///
        /// # Safety
        ///
        /// The caller must ensure that the storage holds a `__T` and owns it.
        #[doc(hidden)]
        #[inline]
        unsafe fn __entry<__T: $name<$($gen),*> + 'static>(
            this: $crate::__private::RawStorage,
            $($arg: $arg_ty),*
        ) -> $ret {
            // SAFETY: Guaranteed by the caller
            let this: __T = unsafe { this.into_inner::<__T>() };
            $crate::operation!(@call $conv [$ret] (<__T as $name<$($gen),*>>::$method(this, $($arg),*)))
        }
    };

    (@call plain [$ret:ty] ($call:expr)) => {
        $call
    };
    (@call convert [$ret:ty] ($call:expr)) => {
        $crate::Convert::<$ret>::convert($call)
    };

    (@ext_impl by_ref $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty]) => {
        $crate::__private::paste! {
            impl<'__a, __I, __O, $($gen: 'static),*> [<$name Ext>]<$($gen),*> for $crate::Any<'__a, __I, __O>
            where
                __I: $crate::Provides<[<$name Operation>]<$($gen),*>>,
                __O: $crate::markers::Access,
            {
                #[inline]
                fn $method(&self, $($arg: $arg_ty),*) -> $ret {
                    let (raw, table) = $crate::__private::split_ref(self);
                    let entry = <__I as $crate::Provides<[<$name Operation>]<$($gen),*>>>::entry(table);
                    // SAFETY: The table was built for the type of the stored object.
                    unsafe { entry(raw, $($arg),*) }
                }
            }
        }
    };
    (@ext_impl by_mut $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty]) => {
        $crate::__private::paste! {
            impl<'__a, __I, __O, $($gen: 'static),*> [<$name Ext>]<$($gen),*> for $crate::Any<'__a, __I, __O>
            where
                __I: $crate::Provides<[<$name Operation>]<$($gen),*>>,
                __O: $crate::markers::Writable,
            {
                #[inline]
                fn $method(&mut self, $($arg: $arg_ty),*) -> $ret {
                    let (raw, table) = $crate::__private::split_mut(self);
                    let entry = <__I as $crate::Provides<[<$name Operation>]<$($gen),*>>>::entry(table);
                    // SAFETY: The table was built for the type of the stored object.
                    unsafe { entry(raw, $($arg),*) }
                }
            }
        }
    };
    (@ext_impl by_value $name:ident [$($gen:ident),*] $method:ident [$($arg:ident : $arg_ty:ty),*] [$ret:ty]) => {
        $crate::__private::paste! {
            impl<'__a, __I, $($gen: 'static),*> [<$name Ext>]<$($gen),*> for $crate::Any<'__a, __I, $crate::markers::Owned>
            where
                __I: $crate::Provides<[<$name Operation>]<$($gen),*>>,
            {
                #[inline]
                fn $method(self, $($arg: $arg_ty),*) -> $ret {
                    let (raw, table) = $crate::__private::into_parts(self);
                    let entry = <__I as $crate::Provides<[<$name Operation>]<$($gen),*>>>::entry(&table);
                    // SAFETY: The table was built for the type of the stored object, and
                    // an `Owned` wrapper owns its object.
                    unsafe { entry(raw, $($arg),*) }
                }
            }
        }
    };
}

/// Declares an interface: the ordered set of operations an
/// [`Any`](crate::Any) dispatches.
///
/// Each entry names an operation declared with
/// [`operation!`](crate::operation!), with concrete type arguments for
/// generic operations. An entry written `..Other` includes every operation of
/// the interface `Other`, in its order. Listing the same operation twice is a
/// compile error.
///
/// The macro generates a unit struct implementing
/// [`Interface`](crate::Interface),
/// [`Implements<T>`](crate::Implements) for every type implementing all the
/// capabilities, [`Provides`](crate::Provides) for each listed operation and
/// [`Narrow<S>`](crate::Narrow) for every interface `S` providing all of them.
///
/// ## Paths
///
/// Both kinds of entry accept a path, such as `..shapes::Base` or
/// `shapes::Area<f64>`. A bare operation name needs the hidden `…Operation`
/// token of the operation in scope, which holds in the declaring module and
/// after a glob import; importing only the capability trait is not enough,
/// so write the path instead.
///
/// `..Base` goes through a helper macro that is imported together with the
/// struct `Base`, so `use shapes::Base;` followed by `..Base` works anywhere
/// in the crate. The helper is not visible to other crates: to build on an
/// interface from a dependency, list its operations.
///
/// # Examples
///
/// ```
/// use raspberry::prelude::*;
///
/// mod io {
///     use raspberry::prelude::*;
///
///     operation! {
///         pub trait Read {
///             fn read(&self) -> u8;
///         }
///     }
///
///     interface! {
///         /// Read-only access.
///         pub struct Reader { Read }
///     }
/// }
///
/// operation! {
///     pub trait Write {
///         fn write(&mut self, value: u8);
///     }
/// }
///
/// use io::{Read, ReadExt, Reader};
///
/// interface! {
///     /// Read-write access.
///     pub struct Register { ..Reader, Write }
/// }
///
/// interface! {
///     /// The same capabilities, in the opposite order.
///     pub struct Port { Write, io::Read }
/// }
///
/// struct Cell(u8);
///
/// impl Read for Cell {
///     fn read(&self) -> u8 {
///         self.0
///     }
/// }
///
/// impl Write for Cell {
///     fn write(&mut self, value: u8) {
///         self.0 = value;
///     }
/// }
///
/// let mut register: Any<'_, Register> = Any::new(Cell(1));
/// register.write(9);
///
/// let port = Any::<Port>::from_any(register);
/// let reader = Any::<Reader>::from_any(port);
/// assert_eq!(reader.read(), 9);
/// ```
#[macro_export]
macro_rules! interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($body:tt)* }
    ) => {
        $crate::interface!(@munch [[$(#[$meta])*] [$vis] $name] [] [$($body)*]);
    };

    (@munch $header:tt $acc:tt []) => {
        $crate::interface!(@define ($) $header $acc);
    };
    (@munch $header:tt $acc:tt [.. $($rest:tt)+]) => {
        $crate::interface!(@base $header $acc [] [$($rest)+]);
    };
    (@munch $header:tt $acc:tt [$($rest:tt)+]) => {
        $crate::interface!(@op $header $acc [] [$($rest)+]);
    };

    (@base $header:tt $acc:tt [$($prefix:tt)*] [$seg:ident :: $($rest:tt)+]) => {
        $crate::interface!(@base $header $acc [$($prefix)* $seg ::] [$($rest)+]);
    };
    (@base $header:tt $acc:tt [$($prefix:tt)*] [$base:ident $(, $($rest:tt)*)?]) => {
        $($prefix)* $base! { @flatten [$($prefix)* $base] $header $acc [$($($rest)*)?] }
    };

    (@op $header:tt $acc:tt [$($prefix:tt)*] [$seg:ident :: $($rest:tt)+]) => {
        $crate::interface!(@op $header $acc [$($prefix)* $seg ::] [$($rest)+]);
    };
    (@op $header:tt [$($acc:tt)*] [$($prefix:tt)*]
        [$op:ident $(< $($gen:ty),+ >)? $(, $($rest:tt)*)?]
    ) => {
        $crate::interface!(@munch
            $header
            [$($acc)* (op [$($prefix)*] $op [$($($gen),+)?])]
            [$($($rest)*)?]
        );
    };

    // Called back by the helper macro of a base interface. Each of its
    // entries becomes a projection through `Member`, which resolves from any
    // module that can name the base.
    (@inherit $path:tt $header:tt [$($acc:tt)*] [$($idx:tt)*] [] $rest:tt) => {
        $crate::interface!(@munch $header [$($acc)*] $rest);
    };
    (@inherit $path:tt $header:tt [$($acc:tt)*] [$($idx:tt)*] [$first:tt $($others:tt)*] $rest:tt) => {
        $crate::interface!(@inherit
            $path
            $header
            [$($acc)* (member $path [$($idx)*])]
            [$crate::__private::Next<$($idx)*>]
            [$($others)*]
            $rest
        );
    };

    (@define ($d:tt)
        [[$(#[$meta:meta])*] [$vis:vis] $name:ident]
        [$($entry:tt)*]
    ) => {
        $(#[$meta])*
        $vis struct $name;

        $crate::__private::paste! {
            #[doc(hidden)]
            #[allow(unused_macros)]
            macro_rules! [<__raspberry_interface_ $name>] {
                (@flatten $d path:tt $d header:tt $d acc:tt $d rest:tt) => {
                    $crate::interface!(@inherit
                        $d path
                        $d header
                        $d acc
                        [$crate::__private::First]
                        [$($entry)*]
                        $d rest
                    );
                };
            }

            #[doc(hidden)]
            #[allow(unused_imports)]
            pub(crate) use [<__raspberry_interface_ $name>] as $name;
        }

        impl $crate::Interface for $name {
            type Table = $crate::interface!(@table $($entry)*);
        }

        $crate::interface!(@provides $name [] $($entry)*);
        $crate::interface!(@members $name [$crate::__private::First] $($entry)*);

        impl<__T: 'static> $crate::Implements<__T> for $name
        where
            $($crate::interface!(@op_type $entry): $crate::OperationFor<__T>,)*
        {
            const TABLE: <Self as $crate::Interface>::Table =
                $crate::interface!(@entries __T; $($entry)*);
        }

        impl<__S> $crate::Narrow<__S> for $name
        where
            __S: $crate::Interface $(+ $crate::Provides<$crate::interface!(@op_type $entry)>)*,
        {
            #[allow(unused_variables)]
            fn narrow(
                table: &<__S as $crate::Interface>::Table,
            ) -> <Self as $crate::Interface>::Table {
                $crate::interface!(@narrow __S table; $($entry)*)
            }
        }
    };

    (@op_type (op [$($prefix:tt)*] $op:ident [$($gen:ty),*])) => {
        $crate::__private::paste!($($prefix)* [<$op Operation>]<$($gen),*>)
    };
    (@op_type (member [$($path:tt)*] [$($idx:tt)*])) => {
        <$($path)* as $crate::__private::Member<$($idx)*>>::Operation
    };

    (@table) => {
        ()
    };
    (@table $entry:tt $($rest:tt)*) => {
        (
            <$crate::interface!(@op_type $entry) as $crate::Operation>::Entry,
            $crate::interface!(@table $($rest)*),
        )
    };

    (@entries $t:ident;) => {
        ()
    };
    (@entries $t:ident; $entry:tt $($rest:tt)*) => {
        (
            <$crate::interface!(@op_type $entry) as $crate::OperationFor<$t>>::ENTRY,
            $crate::interface!(@entries $t; $($rest)*),
        )
    };

    (@narrow $s:ident $table:ident;) => {
        ()
    };
    (@narrow $s:ident $table:ident; $entry:tt $($rest:tt)*) => {
        (
            <$s as $crate::Provides<$crate::interface!(@op_type $entry)>>::entry($table),
            $crate::interface!(@narrow $s $table; $($rest)*),
        )
    };

    (@members $name:ident [$($idx:tt)*]) => {};
    (@members $name:ident [$($idx:tt)*] $entry:tt $($rest:tt)*) => {
        impl $crate::__private::Member<$($idx)*> for $name {
            type Operation = $crate::interface!(@op_type $entry);
        }

        $crate::interface!(@members $name [$crate::__private::Next<$($idx)*>] $($rest)*);
    };

    (@provides $name:ident [$($path:tt)*]) => {};
    (@provides $name:ident [$($path:tt)*] $entry:tt $($rest:tt)*) => {
        impl $crate::Provides<$crate::interface!(@op_type $entry)> for $name {
            #[inline]
            fn entry(
                table: &<Self as $crate::Interface>::Table,
            ) -> <$crate::interface!(@op_type $entry) as $crate::Operation>::Entry {
                table $($path)* .0
            }
        }

        $crate::interface!(@provides $name [$($path)* .1] $($rest)*);
    };
}
